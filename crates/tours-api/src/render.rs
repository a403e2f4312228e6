use bson::{Bson, Document};
use serde_json::{Map, Value};

/// JSON view of a stored document. ObjectIds render as hex strings and
/// datetimes as RFC 3339.
pub fn document_to_json(doc: &Document) -> Value {
    let fields: Map<String, Value> = doc
        .iter()
        .map(|(key, value)| (key.clone(), bson_to_json(value)))
        .collect();
    Value::Object(fields)
}

pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        Bson::Double(n) => Value::from(*n),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use bson::oid::ObjectId;
    use bson::{DateTime, doc};
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_plain_values() {
        let doc = doc! {
            "name": "The Sea Explorer",
            "duration": 7,
            "price": 497.5,
            "secretTour": false,
            "startDates": ["2021-06-19", "2021-07-20"],
            "startLocation": { "address": "Miami, USA" },
            "priceDiscount": Bson::Null,
        };
        assert_eq!(
            document_to_json(&doc),
            json!({
                "name": "The Sea Explorer",
                "duration": 7,
                "price": 497.5,
                "secretTour": false,
                "startDates": ["2021-06-19", "2021-07-20"],
                "startLocation": { "address": "Miami, USA" },
                "priceDiscount": null,
            })
        );
    }

    #[test]
    fn renders_ids_and_dates_as_strings() {
        let oid = ObjectId::parse_str("5c88fa8cf4afda39709c2955").unwrap();
        let doc = doc! { "_id": oid, "createdAt": DateTime::from_millis(0) };
        let json = document_to_json(&doc);
        assert_eq!(json["_id"], "5c88fa8cf4afda39709c2955");
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
    }
}
