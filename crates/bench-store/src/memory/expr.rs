//! Aggregation expressions and BSON ordering.

use super::path::resolve;
use crate::error::StoreError;
use bson::{Bson, Document};
use std::cmp::Ordering;

/// Evaluate an aggregation expression against `doc`.
///
/// Supports `"$field.path"` references, `$size`, `$concat` and plain
/// literals. A reference to a missing field evaluates to `None`.
pub fn evaluate(expr: &Bson, doc: &Document) -> Result<Option<Bson>, StoreError> {
    match expr {
        Bson::String(s) if s.starts_with('$') => Ok(resolve(doc, &s[1..])),
        Bson::Document(spec) => {
            let (name, arg) = operator(spec).ok_or_else(|| {
                StoreError::Unsupported(format!("expression object {spec}"))
            })?;
            evaluate_operator(name, arg, doc)
        }
        literal => Ok(Some(literal.clone())),
    }
}

/// The single `$operator` key of an expression document, if it is one.
pub fn operator(spec: &Document) -> Option<(&str, &Bson)> {
    let mut iter = spec.iter();
    match (iter.next(), iter.next()) {
        (Some((key, value)), None) if key.starts_with('$') => Some((key.as_str(), value)),
        _ => None,
    }
}

fn evaluate_operator(name: &str, arg: &Bson, doc: &Document) -> Result<Option<Bson>, StoreError> {
    match name {
        "$size" => match evaluate(arg, doc)? {
            Some(Bson::Array(items)) => Ok(Some(Bson::Int32(items.len() as i32))),
            other => Err(StoreError::InvalidDocument(format!(
                "$size requires an array, found {other:?}"
            ))),
        },
        "$concat" => {
            let Bson::Array(parts) = arg else {
                return Err(StoreError::InvalidDocument(
                    "$concat requires an array of expressions".to_string(),
                ));
            };
            let mut out = String::new();
            for part in parts {
                match evaluate(part, doc)? {
                    Some(Bson::String(s)) => out.push_str(&s),
                    None | Some(Bson::Null) => return Ok(Some(Bson::Null)),
                    Some(other) => {
                        return Err(StoreError::InvalidDocument(format!(
                            "$concat only supports strings, found {other}"
                        )))
                    }
                }
            }
            Ok(Some(Bson::String(out)))
        }
        other => Err(StoreError::Unsupported(other.to_string())),
    }
}

/// Order two BSON values of comparable types.
///
/// `Int32` and `Int64` compare with each other; values of unrelated types
/// are incomparable.
pub fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Int32(x), Bson::Int32(y)) => Some(x.cmp(y)),
        (Bson::Int32(x), Bson::Int64(y)) => Some(i64::from(*x).cmp(y)),
        (Bson::Int64(x), Bson::Int32(y)) => Some(x.cmp(&i64::from(*y))),
        (Bson::Int64(x), Bson::Int64(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Equality with integer widening.
pub fn values_equal(a: &Bson, b: &Bson) -> bool {
    compare(a, b) == Some(Ordering::Equal) || a == b
}

/// Order for `$sort`: missing values first, incomparable values tie.
pub fn sort_order(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_field_reference() {
        let doc = doc! { "company": { "name": "Acme" } };
        assert_eq!(
            evaluate(&Bson::String("$company.name".into()), &doc).unwrap(),
            Some(Bson::String("Acme".into()))
        );
        assert_eq!(evaluate(&Bson::String("$missing".into()), &doc).unwrap(), None);
        assert_eq!(evaluate(&Bson::Int32(1), &doc).unwrap(), Some(Bson::Int32(1)));
    }

    #[test]
    fn test_concat() {
        let doc = doc! { "name": "Acme" };
        let expr = Bson::Document(doc! { "$concat": ["$name", " Company"] });
        assert_eq!(
            evaluate(&expr, &doc).unwrap(),
            Some(Bson::String("Acme Company".into()))
        );

        let missing = doc! {};
        assert_eq!(evaluate(&expr, &missing).unwrap(), Some(Bson::Null));
    }

    #[test]
    fn test_size() {
        let doc = doc! { "employees": [1, 2, 3] };
        let expr = Bson::Document(doc! { "$size": "$employees" });
        assert_eq!(evaluate(&expr, &doc).unwrap(), Some(Bson::Int32(3)));

        let not_array = doc! { "employees": "x" };
        assert!(evaluate(&expr, &not_array).is_err());
    }

    #[test]
    fn test_unknown_operator() {
        let expr = Bson::Document(doc! { "$reduce": [] });
        assert!(matches!(
            evaluate(&expr, &doc! {}),
            Err(StoreError::Unsupported(_))
        ));
    }

    #[test]
    fn test_integer_comparison_across_widths() {
        assert_eq!(compare(&Bson::Int32(3), &Bson::Int64(3)), Some(Ordering::Equal));
        assert_eq!(compare(&Bson::Int64(2), &Bson::Int32(3)), Some(Ordering::Less));
        assert_eq!(compare(&Bson::Int32(3), &Bson::String("3".into())), None);
    }
}
