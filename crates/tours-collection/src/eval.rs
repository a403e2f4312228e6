use std::cmp::Ordering;

use bson::oid::ObjectId;
use bson::{Bson, DateTime, Document};

use crate::error::CollectionError;
use crate::expression::Expression;

/// Evaluate whether a document matches the given expression.
///
/// Criteria arrive from query strings, so string values are cast to the
/// stored field's type before comparing. A value that cannot be cast is an
/// error rather than a silent mismatch.
pub(crate) fn matches(doc: &Document, expr: &Expression) -> Result<bool, CollectionError> {
    match expr {
        Expression::And(children) => {
            for child in children {
                if !matches(doc, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expression::Or(children) => {
            for child in children {
                if matches(doc, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expression::Eq(field, val) => field_eq(doc, field, val),
        Expression::Ne(field, val) => field_eq(doc, field, val).map(|eq| !eq),
        Expression::In(field, vals) => {
            for val in vals {
                if field_eq(doc, field, val)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expression::Gt(field, val)
        | Expression::Gte(field, val)
        | Expression::Lt(field, val)
        | Expression::Lte(field, val) => {
            let predicate: fn(Ordering) -> bool = match expr {
                Expression::Gt(..) => |o| o == Ordering::Greater,
                Expression::Gte(..) => |o| o != Ordering::Less,
                Expression::Lt(..) => |o| o == Ordering::Less,
                _ => |o| o != Ordering::Greater,
            };
            match present(get_path(doc, field)) {
                None => Ok(false),
                Some(Bson::Array(items)) => {
                    for item in items {
                        if range_match(field, item, val, predicate)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                Some(value) => range_match(field, value, val, predicate),
            }
        }
        Expression::Regex(field, re) => match get_path(doc, field) {
            Some(Bson::String(s)) => Ok(re.is_match(s)),
            Some(Bson::Array(items)) => Ok(items
                .iter()
                .any(|item| matches!(item, Bson::String(s) if re.is_match(s)))),
            _ => Ok(false),
        },
        // Physical presence: a null value still exists.
        Expression::Exists(field, expected) => Ok(get_path(doc, field).is_some() == *expected),
    }
}

/// `$eq` semantics. Null matches missing fields, array fields match when any
/// element (or the whole array) is equal, and an array criterion against a
/// scalar field matches any of its elements.
fn field_eq(doc: &Document, field: &str, criterion: &Bson) -> Result<bool, CollectionError> {
    let stored = present(get_path(doc, field));

    if matches!(criterion, Bson::Null) {
        return Ok(stored.is_none());
    }
    let Some(stored) = stored else {
        return Ok(false);
    };

    match (stored, criterion) {
        (Bson::Array(items), _) => {
            if stored == criterion {
                return Ok(true);
            }
            for item in items {
                if scalar_eq(field, item, criterion)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (_, Bson::Array(options)) => {
            for option in options {
                if scalar_eq(field, stored, option)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => scalar_eq(field, stored, criterion),
    }
}

fn scalar_eq(field: &str, stored: &Bson, criterion: &Bson) -> Result<bool, CollectionError> {
    let criterion = cast(field, stored, criterion)?;
    Ok(match compare_values(stored, &criterion) {
        Some(ord) => ord == Ordering::Equal,
        None => stored == &criterion,
    })
}

fn range_match(
    field: &str,
    stored: &Bson,
    criterion: &Bson,
    predicate: fn(Ordering) -> bool,
) -> Result<bool, CollectionError> {
    let criterion = cast(field, stored, criterion)?;
    Ok(compare_values(stored, &criterion).is_some_and(predicate))
}

/// Cast a string criterion to the type of the stored value. Anything that is
/// not a string is returned unchanged.
fn cast(field: &str, stored: &Bson, criterion: &Bson) -> Result<Bson, CollectionError> {
    let Bson::String(raw) = criterion else {
        return Ok(criterion.clone());
    };
    let text = raw.trim();

    match stored {
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => text
            .parse::<f64>()
            .ok()
            .filter(|n| !n.is_nan())
            .map(Bson::Double)
            .ok_or_else(|| CollectionError::cast(field, raw)),
        Bson::Boolean(_) => match text {
            "true" => Ok(Bson::Boolean(true)),
            "false" => Ok(Bson::Boolean(false)),
            _ => Err(CollectionError::cast(field, raw)),
        },
        Bson::DateTime(_) => DateTime::parse_rfc3339_str(text)
            .map(Bson::DateTime)
            .map_err(|_| CollectionError::cast(field, raw)),
        Bson::ObjectId(_) => ObjectId::parse_str(text)
            .map(Bson::ObjectId)
            .map_err(|_| CollectionError::cast(field, raw)),
        _ => Ok(criterion.clone()),
    }
}

/// Resolve a dotted path (`startLocation.address`) through sub-documents.
pub(crate) fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    match path.split_once('.') {
        None => doc.get(path),
        Some((top, rest)) => match doc.get(top)? {
            Bson::Document(sub) => get_path(sub, rest),
            _ => None,
        },
    }
}

fn present(value: Option<&Bson>) -> Option<&Bson> {
    value.filter(|v| !matches!(v, Bson::Null))
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Compare two values of comparable types. `None` when the types differ.
pub(crate) fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::Int32(a), Bson::Int32(b)) => Some(a.cmp(b)),
        (Bson::Int64(a), Bson::Int64(b)) => Some(a.cmp(b)),
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.cmp(b)),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

/// Cross-type ordering used for sorting, following MongoDB's type order.
fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        _ => 12,
    }
}

/// Total order over optional field values; missing and null sort first.
pub(crate) fn compare_for_sort(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (present(a), present(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(a, b)
            .unwrap_or_else(|| type_rank(a).cmp(&type_rank(b))),
    }
}
