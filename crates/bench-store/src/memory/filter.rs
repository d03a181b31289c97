//! Query filter matching.

use super::expr::{compare, values_equal};
use super::path::candidate_values;
use crate::error::StoreError;
use bson::{Bson, Document};
use std::cmp::Ordering;

/// Whether `doc` satisfies `filter`.
///
/// Supports field equality and `$lt`. Dotted paths descend into
/// sub-documents and arrays.
pub fn matches(doc: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (path, condition) in filter {
        if path.starts_with('$') {
            return Err(StoreError::Unsupported(path.clone()));
        }
        if !field_matches(doc, path, condition)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn field_matches(doc: &Document, path: &str, condition: &Bson) -> Result<bool, StoreError> {
    let candidates = candidate_values(doc, path);

    let operators = match condition {
        Bson::Document(spec) if spec.keys().next().is_some_and(|k| k.starts_with('$')) => spec,
        value => return Ok(candidates.iter().any(|c| values_equal(c, value))),
    };

    for (op, operand) in operators {
        let ok = match op.as_str() {
            "$lt" => candidates
                .iter()
                .any(|c| compare(c, operand) == Some(Ordering::Less)),
            other => return Err(StoreError::Unsupported(other.to_string())),
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}
