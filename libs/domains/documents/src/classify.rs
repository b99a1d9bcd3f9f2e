//! Mapping of driver failures onto [`DocumentError`] and [`InsertBatchResult`]

use mongodb::error::{Error as DriverError, ErrorKind, WriteFailure as DriverWriteFailure};

use crate::error::{DocumentError, DocumentResult};
use crate::models::{InsertBatchResult, Value, WriteFailure};

/// Server code for a unique index violation
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Server codes meaning an index with that name (or key) is already there
const INDEX_EXISTS_CODES: [i32; 3] = [68, 85, 86];

/// Split failures into duplicate-key and everything else
///
/// Unordered batches: every document without a failure was written. If only
/// duplicate keys failed the batch counts as a success with a reduced count;
/// any other failure turns the whole result into [`DocumentError::Insert`].
///
/// Ordered batches stop at the first failure, so nothing after it was tried and
/// every failure is reported as fatal.
pub fn partition_failures(
    attempted: usize,
    failures: Vec<WriteFailure>,
    ordered: bool,
) -> DocumentResult<InsertBatchResult> {
    if failures.is_empty() {
        return Ok(InsertBatchResult::complete(attempted));
    }

    if ordered {
        let succeeded = failures
            .iter()
            .filter_map(|f| f.index)
            .min()
            .unwrap_or(attempted);
        return Err(DocumentError::Insert(Box::new(InsertBatchResult {
            attempted,
            succeeded,
            duplicates: Vec::new(),
            failures,
        })));
    }

    let failed_documents = failures.iter().filter(|f| f.index.is_some()).count();
    let (duplicates, others): (Vec<_>, Vec<_>) =
        failures.into_iter().partition(WriteFailure::is_duplicate_key);

    let result = InsertBatchResult {
        attempted,
        succeeded: attempted.saturating_sub(failed_documents),
        duplicates,
        failures: others,
    };

    if result.failures.is_empty() {
        Ok(result)
    } else {
        Err(DocumentError::Insert(Box::new(result)))
    }
}

/// Interpret the error returned by `insert_many`
///
/// `ids` holds the `_id` of each submitted document, by position.
pub fn insert_many_error(
    err: DriverError,
    ids: &[Option<Value>],
    ordered: bool,
) -> DocumentResult<InsertBatchResult> {
    let failures = match *err.kind {
        ErrorKind::InsertMany(ref failure) => {
            let mut failures: Vec<WriteFailure> = failure
                .write_errors
                .iter()
                .flatten()
                .map(|e| WriteFailure {
                    index: Some(e.index),
                    code: e.code,
                    message: e.message.clone(),
                    key: ids.get(e.index).cloned().flatten(),
                })
                .collect();

            if let Some(ref concern) = failure.write_concern_error {
                failures.push(WriteFailure {
                    index: None,
                    code: concern.code,
                    message: concern.message.clone(),
                    key: None,
                });
            }
            failures
        }
        _ => return Err(err.into()),
    };

    partition_failures(ids.len(), failures, ordered)
}

/// Interpret the error returned by a single-document write
pub fn write_error(err: DriverError) -> DocumentError {
    match *err.kind {
        ErrorKind::Write(DriverWriteFailure::WriteError(ref e)) if e.code == DUPLICATE_KEY_CODE => {
            DocumentError::DuplicateKey(e.message.clone())
        }
        _ => err.into(),
    }
}

/// Interpret the error returned by `createIndexes`
pub fn create_index_error(err: DriverError, index_name: &str) -> DocumentError {
    match *err.kind {
        ErrorKind::Command(ref e)
            if INDEX_EXISTS_CODES.contains(&e.code) || e.message.contains("already exists") =>
        {
            DocumentError::IndexExists(index_name.to_string())
        }
        _ => DocumentError::Query(err.to_string()),
    }
}
