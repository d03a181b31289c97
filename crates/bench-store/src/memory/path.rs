//! Dotted field path access.

use bson::{Bson, Document};

/// Every value reachable through `path`, descending into arrays.
///
/// When the path ends on an array, both its elements and the array itself
/// are returned, so `{ "tags": "x" }` matches `tags: ["x", "y"]`.
pub fn candidate_values<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let parts: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    if let Some((head, rest)) = parts.split_first() {
        if let Some(value) = doc.get(*head) {
            collect(value, rest, &mut out);
        }
    }
    out
}

fn collect<'a>(value: &'a Bson, parts: &[&str], out: &mut Vec<&'a Bson>) {
    match parts.split_first() {
        None => {
            if let Bson::Array(items) = value {
                out.extend(items.iter());
            }
            out.push(value);
        }
        Some((head, rest)) => match value {
            Bson::Document(doc) => {
                if let Some(next) = doc.get(*head) {
                    collect(next, rest, out);
                }
            }
            Bson::Array(items) => {
                for item in items {
                    if let Bson::Document(doc) = item {
                        if let Some(next) = doc.get(*head) {
                            collect(next, rest, out);
                        }
                    }
                }
            }
            _ => {}
        },
    }
}

/// Resolve `path` the way an aggregation expression does.
///
/// Paths crossing an array yield an array of the per-element values.
/// Returns `None` when the field is missing.
pub fn resolve(doc: &Document, path: &str) -> Option<Bson> {
    let parts: Vec<&str> = path.split('.').collect();
    let (head, rest) = parts.split_first()?;
    resolve_value(doc.get(*head)?, rest)
}

fn resolve_value(value: &Bson, parts: &[&str]) -> Option<Bson> {
    let Some((head, rest)) = parts.split_first() else {
        return Some(value.clone());
    };
    match value {
        Bson::Document(doc) => resolve_value(doc.get(*head)?, rest),
        Bson::Array(items) => Some(Bson::Array(
            items
                .iter()
                .filter_map(|item| match item {
                    Bson::Document(doc) => doc.get(*head).and_then(|v| resolve_value(v, rest)),
                    _ => None,
                })
                .collect(),
        )),
        _ => None,
    }
}

/// Set `path` to `value`, creating intermediate sub-documents.
pub fn set_path(doc: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            doc.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(doc.get(head), Some(Bson::Document(_))) {
                doc.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = doc.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}

/// Remove `path` if present.
pub fn unset_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(child)) = doc.get_mut(head) {
                unset_path(child, rest);
            }
        }
    }
}

/// Copy only `path` out of `value`, keeping the surrounding shape.
///
/// `company.name` on a person yields `{ company: { name: ... } }`.
pub fn include_path(value: &Bson, parts: &[&str]) -> Option<Bson> {
    let Some((head, rest)) = parts.split_first() else {
        return Some(value.clone());
    };
    match value {
        Bson::Document(doc) => {
            let inner = include_path(doc.get(*head)?, rest)?;
            let mut out = Document::new();
            out.insert(*head, inner);
            Some(Bson::Document(out))
        }
        _ => None,
    }
}

/// Merge `value` under `key`, combining sub-documents field by field.
pub fn merge_field(target: &mut Document, key: &str, value: Bson) {
    let value = match (target.get_mut(key), value) {
        (Some(Bson::Document(existing)), Bson::Document(incoming)) => {
            for (k, v) in incoming {
                merge_field(existing, &k, v);
            }
            return;
        }
        (_, value) => value,
    };
    target.insert(key, value);
}
