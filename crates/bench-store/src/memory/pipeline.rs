//! Aggregation pipeline and projection evaluation.

use super::expr::{evaluate, operator, sort_order};
use super::filter::matches;
use super::path::{candidate_values, include_path, merge_field, resolve, set_path, unset_path};
use crate::error::StoreError;
use bson::{Bson, Document};
use std::collections::HashMap;

/// Run `pipeline` over `input`; `collections` backs `$lookup`.
pub fn run(
    collections: &HashMap<String, Vec<Document>>,
    mut docs: Vec<Document>,
    pipeline: &[Document],
) -> Result<Vec<Document>, StoreError> {
    for stage in pipeline {
        let (name, spec) = operator(stage).ok_or_else(|| {
            StoreError::InvalidDocument(format!("pipeline stage must have one key: {stage}"))
        })?;
        docs = match name {
            "$match" => {
                let filter = as_document(name, spec)?;
                let mut kept = Vec::with_capacity(docs.len());
                for doc in docs {
                    if matches(&doc, filter)? {
                        kept.push(doc);
                    }
                }
                kept
            }
            "$project" => {
                let projection = as_document(name, spec)?;
                docs.iter()
                    .map(|doc| project(doc, projection))
                    .collect::<Result<_, _>>()?
            }
            "$set" => {
                let fields = as_document(name, spec)?;
                docs.into_iter()
                    .map(|doc| set_fields(doc, fields))
                    .collect::<Result<_, _>>()?
            }
            "$lookup" => lookup(collections, docs, as_document(name, spec)?)?,
            "$unwind" => unwind(docs, spec)?,
            "$group" => group(docs, as_document(name, spec)?)?,
            "$sort" => {
                sort(&mut docs, as_document(name, spec)?);
                docs
            }
            "$limit" => {
                let n = match spec {
                    Bson::Int32(n) if *n >= 0 => *n as usize,
                    Bson::Int64(n) if *n >= 0 => *n as usize,
                    _ => {
                        return Err(StoreError::InvalidDocument(
                            "$limit requires a non-negative integer".to_string(),
                        ))
                    }
                };
                docs.truncate(n);
                docs
            }
            other => return Err(StoreError::Unsupported(other.to_string())),
        };
    }
    Ok(docs)
}

fn as_document<'a>(stage: &str, spec: &'a Bson) -> Result<&'a Document, StoreError> {
    match spec {
        Bson::Document(d) => Ok(d),
        _ => Err(StoreError::InvalidDocument(format!(
            "{stage} requires a document"
        ))),
    }
}

/// Apply a `find`/`$project` inclusion projection.
///
/// `1`/`true` includes a (possibly dotted) path, anything else is an
/// expression whose result is stored under the key. `_id` is kept unless
/// it is projected as `0`.
pub fn project(doc: &Document, projection: &Document) -> Result<Document, StoreError> {
    let mut out = Document::new();
    let exclude_id = projection.get("_id").is_some_and(is_exclusion);
    if !exclude_id && !projection.contains_key("_id") {
        if let Some(id) = doc.get("_id") {
            out.insert("_id", id.clone());
        }
    }

    let source = Bson::Document(doc.clone());
    for (key, value) in projection {
        if key == "_id" && is_exclusion(value) {
            continue;
        }
        if is_exclusion(value) {
            return Err(StoreError::Unsupported(format!(
                "exclusion of '{key}' in an inclusion projection"
            )));
        }
        if is_inclusion(value) {
            let parts: Vec<&str> = key.split('.').collect();
            if let Some(Bson::Document(included)) = include_path(&source, &parts) {
                for (k, v) in included {
                    merge_field(&mut out, &k, v);
                }
            }
        } else if let Some(computed) = evaluate(value, doc)? {
            set_path(&mut out, key, computed);
        }
    }
    Ok(out)
}

fn is_exclusion(value: &Bson) -> bool {
    matches!(value, Bson::Boolean(false) | Bson::Int32(0) | Bson::Int64(0))
}

fn is_inclusion(value: &Bson) -> bool {
    matches!(value, Bson::Boolean(true))
        || matches!(value, Bson::Int32(n) if *n != 0)
        || matches!(value, Bson::Int64(n) if *n != 0)
}

fn set_fields(mut doc: Document, fields: &Document) -> Result<Document, StoreError> {
    let snapshot = doc.clone();
    for (key, expr) in fields {
        match evaluate(expr, &snapshot)? {
            Some(value) => set_path(&mut doc, key, value),
            None => unset_path(&mut doc, key),
        }
    }
    Ok(doc)
}

fn lookup(
    collections: &HashMap<String, Vec<Document>>,
    docs: Vec<Document>,
    spec: &Document,
) -> Result<Vec<Document>, StoreError> {
    let from = spec.get_str("from")?;
    let local_field = spec.get_str("localField")?;
    let foreign_field = spec.get_str("foreignField")?;
    let as_field = spec.get_str("as")?;

    let foreign: &[Document] = collections.get(from).map_or(&[], Vec::as_slice);

    // Index the foreign side once by join key.
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (position, candidate) in foreign.iter().enumerate() {
        for value in candidate_values(candidate, foreign_field) {
            index.entry(value.to_string()).or_default().push(position);
        }
    }

    let mut out = Vec::with_capacity(docs.len());
    for mut doc in docs {
        let mut positions: Vec<usize> = candidate_values(&doc, local_field)
            .into_iter()
            .filter_map(|value| index.get(&value.to_string()))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();

        let joined: Vec<Bson> = positions
            .into_iter()
            .map(|p| Bson::Document(foreign[p].clone()))
            .collect();
        set_path(&mut doc, as_field, Bson::Array(joined));
        out.push(doc);
    }
    Ok(out)
}

fn unwind(docs: Vec<Document>, spec: &Bson) -> Result<Vec<Document>, StoreError> {
    let path = match spec {
        Bson::String(path) => path.strip_prefix('$').ok_or_else(|| {
            StoreError::InvalidDocument(format!("$unwind path must start with '$': {path}"))
        })?,
        _ => {
            return Err(StoreError::InvalidDocument(
                "$unwind requires a field path".to_string(),
            ))
        }
    };

    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        match resolve(&doc, path) {
            Some(Bson::Array(items)) => {
                for item in items {
                    let mut unwound = doc.clone();
                    set_path(&mut unwound, path, item);
                    out.push(unwound);
                }
            }
            Some(Bson::Null) | None => {}
            Some(_) => out.push(doc),
        }
    }
    Ok(out)
}

fn group(docs: Vec<Document>, spec: &Document) -> Result<Vec<Document>, StoreError> {
    let id_expr = spec
        .get("_id")
        .ok_or_else(|| StoreError::InvalidDocument("$group requires _id".to_string()))?;

    let mut order: Vec<Document> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for doc in &docs {
        let key = evaluate(id_expr, doc)?.unwrap_or(Bson::Null);
        let slot = *positions.entry(key.to_string()).or_insert_with(|| {
            order.push(bson::doc! { "_id": key.clone() });
            order.len() - 1
        });

        for (field, accumulator) in spec {
            if field == "_id" {
                continue;
            }
            let (op, arg) = match accumulator {
                Bson::Document(a) => operator(a),
                _ => None,
            }
            .ok_or_else(|| {
                StoreError::InvalidDocument(format!("invalid accumulator for {field}"))
            })?;
            let value = evaluate(arg, doc)?;
            accumulate(&mut order[slot], field, op, value)?;
        }
    }
    Ok(order)
}

fn accumulate(
    acc: &mut Document,
    field: &str,
    op: &str,
    value: Option<Bson>,
) -> Result<(), StoreError> {
    let next = match (op, acc.get(field)) {
        ("$sum", current) => {
            let total = integer(current) + integer(value.as_ref());
            match i32::try_from(total) {
                Ok(n) => Bson::Int32(n),
                Err(_) => Bson::Int64(total),
            }
        }
        ("$min", None) => value.unwrap_or(Bson::Null),
        ("$min", Some(existing)) => match value {
            Some(v) if sort_order(Some(&v), Some(existing)).is_lt() => v,
            _ => return Ok(()),
        },
        (other, _) => return Err(StoreError::Unsupported(other.to_string())),
    };
    acc.insert(field, next);
    Ok(())
}

fn integer(value: Option<&Bson>) -> i64 {
    match value {
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Int64(n)) => *n,
        _ => 0,
    }
}

/// Stable sort by the keys of `spec` (`1` ascending, `-1` descending).
pub fn sort(docs: &mut [Document], spec: &Document) {
    docs.sort_by(|a, b| {
        for (key, direction) in spec {
            let descending = matches!(direction, Bson::Int32(n) if *n < 0)
                || matches!(direction, Bson::Int64(n) if *n < 0);
            let av = resolve(a, key);
            let bv = resolve(b, key);
            let ord = sort_order(av.as_ref(), bv.as_ref());
            let ord = if descending { ord.reverse() } else { ord };
            if ord.is_ne() {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
}
