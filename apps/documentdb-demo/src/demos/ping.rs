use std::io::Write;

use database::mongodb::{Session, check_health_detailed};
use eyre::bail;

/// Ping the gateway and report round-trip latency
pub async fn run(session: &Session, out: &mut impl Write) -> eyre::Result<()> {
    let status = check_health_detailed(session).await;

    if !status.healthy {
        bail!(
            "Ping failed after {} ms: {}",
            status.response_time_ms,
            status.message.unwrap_or_default()
        );
    }

    writeln!(
        out,
        "DocumentDB is healthy (database: {}, ping: {} ms)",
        session.database_name(),
        status.response_time_ms
    )?;
    Ok(())
}
