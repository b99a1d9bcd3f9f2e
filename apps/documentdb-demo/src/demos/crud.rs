use std::io::Write;

use domain_documents::{Document, DocumentService, DocumentStore, Filter, Value};
use eyre::{OptionExt, WrapErr};
use tracing::info;

use super::Target;
use crate::output;
use crate::samples;

const QUERY_LIMIT: i64 = 10;
const LIST_LIMIT: i64 = 100;

/// Create, read, update and delete walkthrough over a users collection
pub async fn run<S: DocumentStore>(
    service: &DocumentService<S>,
    target: &Target,
    out: &mut impl Write,
) -> eyre::Result<()> {
    let users = target.collection.as_str();

    let cleared = service
        .delete_all(users)
        .await
        .wrap_err("Cleanup before the demo failed")?;
    writeln!(out, "Removed {} leftover documents from {}", cleared, target.namespace())?;

    writeln!(out, "{}", output::section(1, "Create operations"))?;
    let first_id = service
        .insert_one(users, samples::first_user())
        .await
        .wrap_err("Step 1 (create one document) failed")?;
    writeln!(out, "Document created with ID: {}", first_id)?;

    let batch: Vec<Document> = samples::more_users()
        .into_iter()
        .map(|user| user.with(domain_documents::CREATED_AT_FIELD, Value::now()))
        .collect();
    let inserted = service
        .insert_many(users, batch, false)
        .await
        .wrap_err("Step 1 (create documents) failed")?;
    writeln!(out, "Created {} documents", inserted.succeeded)?;

    writeln!(out, "{}", output::section(2, "Read operations"))?;
    let first = service
        .find_by_id(users, first_id.clone())
        .await
        .wrap_err("Step 2 (read by id) failed")?
        .ok_or_eyre("Step 2 (read by id) failed: document just created was not found")?;
    writeln!(out, "{}", output::document_block(&first))?;

    writeln!(out, "\nQuerying for active users:")?;
    let active = service
        .find_with_limit(users, &Filter::eq("status", "active"), QUERY_LIMIT)
        .await
        .wrap_err("Step 2 (query active users) failed")?;
    for user in &active {
        writeln!(out, "{}", output::user_line(user, None, "email"))?;
    }

    writeln!(out, "\nQuerying for users in Seattle:")?;
    let seattle = service
        .find_with_limit(users, &Filter::eq("city", "Seattle"), QUERY_LIMIT)
        .await
        .wrap_err("Step 2 (query users in Seattle) failed")?;
    for user in &seattle {
        writeln!(out, "{}", output::user_line(user, Some("Age"), "age"))?;
    }

    let all = service
        .find_with_limit(users, &Filter::All, LIST_LIMIT)
        .await
        .wrap_err("Step 2 (read all documents) failed")?;
    writeln!(out, "\nTotal users in collection: {}", all.len())?;

    writeln!(out, "{}", output::section(3, "Update operations"))?;
    let by_id = Filter::eq("_id", first_id.clone());
    let modified = service
        .update_one(
            users,
            &by_id,
            Document::new()
                .with("age", 29)
                .with("city", "San Francisco")
                .with("lastLogin", Value::now()),
        )
        .await
        .wrap_err("Step 3 (update one document) failed")?;
    writeln!(out, "Updated {} document ({})", modified, first_id)?;

    if let Some(updated) = service
        .find_one(users, &by_id)
        .await
        .wrap_err("Step 3 (verify update) failed")?
    {
        let age = updated
            .get("age")
            .map(ToString::to_string)
            .unwrap_or_default();
        writeln!(out, "  Updated age: {}", age)?;
        writeln!(
            out,
            "  Updated city: {}",
            updated.get_str("city").unwrap_or_default()
        )?;
    }

    let reactivated = service
        .update_many(
            users,
            &Filter::eq("status", "inactive"),
            Document::new()
                .with("status", "active")
                .with("statusChangedAt", Value::now()),
        )
        .await
        .wrap_err("Step 3 (reactivate inactive users) failed")?;
    writeln!(out, "Updated {} inactive users to active", reactivated)?;

    writeln!(out, "{}", output::section(4, "Delete operations"))?;
    let removed = service
        .delete_many(users, &Filter::gt("age", 40))
        .await
        .wrap_err("Step 4 (delete users over 40) failed")?;
    writeln!(out, "Deleted {} users over age 40", removed)?;

    let remaining = service
        .find_with_limit(users, &Filter::All, LIST_LIMIT)
        .await
        .wrap_err("Step 4 (list remaining users) failed")?;
    writeln!(out, "\nRemaining users: {}", remaining.len())?;
    for user in &remaining {
        writeln!(out, "{}", output::user_line(user, Some("Age"), "age"))?;
    }

    let deleted = service
        .delete_one(users, &by_id)
        .await
        .wrap_err("Step 4 (delete one document) failed")?;
    writeln!(out, "Deleted {} document ({})", deleted, first_id)?;

    writeln!(out, "{}", output::section(5, "Cleanup"))?;
    let cleaned = service
        .delete_all(users)
        .await
        .wrap_err("Step 5 (delete all documents) failed")?;
    writeln!(out, "Deleted all {} remaining documents", cleaned)?;

    let left = service
        .count(users, &Filter::All)
        .await
        .wrap_err("Step 5 (count documents) failed")?;
    info!(left, "CRUD demo complete");
    Ok(())
}
