use bson::{Bson, Document};
use regex::Regex;

use crate::error::CollectionError;
use crate::expression::Expression;

/// Compile a filter document into an [`Expression`].
///
/// Follows MongoDB query semantics:
/// - an empty document matches everything
/// - top-level entries are an implicit AND
/// - `{ "field": value }` is implicit `$eq`
/// - `{ "field": { "$gte": v } }` uses operator sub-documents
/// - `{ "$or": [...] }` / `{ "$and": [...] }` for explicit logical ops
/// - `{ "field": { "$regex": "pattern", "$options": "i" } }` for regex
pub fn parse_filter(doc: &Document) -> Result<Expression, CollectionError> {
    let mut children = Vec::new();

    for (key, value) in doc {
        match key.as_str() {
            "$and" => children.push(Expression::And(parse_logical_array(value)?)),
            "$or" => children.push(Expression::Or(parse_logical_array(value)?)),
            k if k.starts_with('$') => {
                return Err(CollectionError::InvalidQuery(format!(
                    "unknown top-level operator: {k}"
                )));
            }
            _ => children.push(parse_field_condition(key, value)?),
        }
    }

    match children.len() {
        1 => Ok(children.remove(0)),
        _ => Ok(Expression::And(children)),
    }
}

fn parse_logical_array(value: &Bson) -> Result<Vec<Expression>, CollectionError> {
    let Bson::Array(items) = value else {
        return Err(CollectionError::InvalidQuery(
            "$and/$or value must be an array".into(),
        ));
    };

    let mut children = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Bson::Document(sub_doc) => children.push(parse_filter(sub_doc)?),
            _ => {
                return Err(CollectionError::InvalidQuery(
                    "$and/$or array elements must be documents".into(),
                ));
            }
        }
    }

    if children.is_empty() {
        return Err(CollectionError::InvalidQuery(
            "$and/$or array must not be empty".into(),
        ));
    }
    Ok(children)
}

/// Either implicit `$eq` or an operator sub-document.
fn parse_field_condition(field: &str, value: &Bson) -> Result<Expression, CollectionError> {
    if let Bson::Document(sub_doc) = value
        && sub_doc.keys().next().is_some_and(|k| k.starts_with('$'))
    {
        return parse_operator_doc(field, sub_doc);
    }
    Ok(Expression::Eq(field.to_string(), value.clone()))
}

/// Parse an operator sub-document like `{ "$gt": "21", "$lte": "100" }`.
fn parse_operator_doc(field: &str, doc: &Document) -> Result<Expression, CollectionError> {
    if doc.contains_key("$regex") {
        return parse_regex(field, doc);
    }

    let mut conditions = Vec::new();
    for (op, value) in doc {
        let f = field.to_string();
        let expr = match op.as_str() {
            "$eq" => Expression::Eq(f, value.clone()),
            "$ne" => Expression::Ne(f, value.clone()),
            "$gt" => Expression::Gt(f, value.clone()),
            "$gte" => Expression::Gte(f, value.clone()),
            "$lt" => Expression::Lt(f, value.clone()),
            "$lte" => Expression::Lte(f, value.clone()),
            "$in" => match value {
                Bson::Array(items) => Expression::In(f, items.clone()),
                _ => {
                    return Err(CollectionError::InvalidQuery(
                        "$in value must be an array".into(),
                    ));
                }
            },
            "$exists" => match value {
                Bson::Boolean(b) => Expression::Exists(f, *b),
                _ => {
                    return Err(CollectionError::InvalidQuery(
                        "$exists value must be a boolean".into(),
                    ));
                }
            },
            "$options" => {
                return Err(CollectionError::InvalidQuery(
                    "$options without $regex".into(),
                ));
            }
            k => {
                return Err(CollectionError::InvalidQuery(format!(
                    "unknown field operator: {k}"
                )));
            }
        };
        conditions.push(expr);
    }

    match conditions.len() {
        1 => Ok(conditions.remove(0)),
        _ => Ok(Expression::And(conditions)),
    }
}

/// Parse a `$regex` + optional `$options` sub-document.
fn parse_regex(field: &str, doc: &Document) -> Result<Expression, CollectionError> {
    let mut pattern: Option<&str> = None;
    let mut options: Option<&str> = None;

    for (key, value) in doc {
        match (key.as_str(), value) {
            ("$regex", Bson::String(s)) => pattern = Some(s.as_str()),
            ("$options", Bson::String(s)) => options = Some(s.as_str()),
            ("$regex" | "$options", _) => {
                return Err(CollectionError::InvalidQuery(format!(
                    "{key} value must be a string"
                )));
            }
            (k, _) => {
                return Err(CollectionError::InvalidQuery(format!(
                    "unexpected key alongside $regex: {k}"
                )));
            }
        }
    }

    let pat = pattern.ok_or_else(|| CollectionError::InvalidQuery("missing $regex pattern".into()))?;

    let full_pattern = match options {
        Some(opts) => {
            let mut prefix = String::with_capacity(4 + opts.len() + pat.len());
            prefix.push_str("(?");
            for ch in opts.chars() {
                match ch {
                    'i' | 's' | 'm' | 'x' => prefix.push(ch),
                    c => {
                        return Err(CollectionError::InvalidQuery(format!(
                            "unknown regex option: {c}"
                        )));
                    }
                }
            }
            prefix.push(')');
            prefix.push_str(pat);
            prefix
        }
        None => pat.to_string(),
    };

    Ok(Expression::Regex(field.to_string(), Regex::new(&full_pattern)?))
}
