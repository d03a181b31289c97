//! Update application.

use super::path::set_path;
use super::pipeline;
use crate::error::StoreError;
use crate::store::Update;
use bson::{Bson, Document};
use std::collections::HashMap;

/// Apply `update` to `doc` in place, returning whether anything changed.
pub fn apply(doc: &mut Document, update: &Update) -> Result<bool, StoreError> {
    let before = doc.clone();
    let id = doc.get("_id").cloned();

    match update {
        Update::Operators(operators) => apply_operators(doc, operators)?,
        Update::Pipeline(stages) => {
            let updated = pipeline::run(&HashMap::new(), vec![doc.clone()], stages)?;
            match updated.into_iter().next() {
                Some(updated) => *doc = updated,
                None => {
                    return Err(StoreError::InvalidDocument(
                        "update pipeline removed the document".to_string(),
                    ))
                }
            }
        }
    }

    if doc.get("_id").cloned() != id {
        *doc = before;
        return Err(StoreError::Rejected("_id is immutable".to_string()));
    }

    Ok(*doc != before)
}

fn apply_operators(doc: &mut Document, operators: &Document) -> Result<(), StoreError> {
    for (op, fields) in operators {
        let Bson::Document(fields) = fields else {
            return Err(StoreError::InvalidDocument(format!(
                "{op} requires a document"
            )));
        };
        match op.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(doc, path, value.clone());
                }
            }
            other => return Err(StoreError::Unsupported(other.to_string())),
        }
    }
    Ok(())
}
