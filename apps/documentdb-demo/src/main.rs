use clap::Parser;
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};

use documentdb_demo::cli::Cli;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let cli = Cli::parse();
    init_tracing(&Environment::from_env());

    let mut stdout = std::io::stdout();
    documentdb_demo::run(cli, &mut stdout).await
}
