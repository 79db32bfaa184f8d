//! Translation between [`FieldValue`] and Firestore's typed JSON values, and
//! construction of `runQuery` request bodies.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::db::document::{
    format_timestamp, Direction, Document, FieldFilter, FieldValue, Query,
};
use crate::db::StoreError;

pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        // Firestore transports int64 as a decimal string.
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(ts) => json!({ "timestampValue": format_timestamp(ts) }),
        FieldValue::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        FieldValue::Map(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

fn malformed(kind: &str, raw: &Value) -> StoreError {
    StoreError::Decode(format!("unexpected {kind}: {raw}"))
}

pub fn decode_value(raw: &Value) -> Result<FieldValue, StoreError> {
    let Some((kind, inner)) = raw.as_object().and_then(|o| o.iter().next()) else {
        return Err(malformed("value", raw));
    };

    match kind.as_str() {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Boolean)
            .ok_or_else(|| malformed(kind, inner)),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse()
                .map(FieldValue::Integer)
                .map_err(|_| malformed(kind, inner)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Integer)
                .ok_or_else(|| malformed(kind, inner)),
            _ => Err(malformed(kind, inner)),
        },
        "doubleValue" => match inner {
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Double)
                .ok_or_else(|| malformed(kind, inner)),
            // NaN and the infinities arrive as strings.
            Value::String(s) => s
                .parse()
                .map(FieldValue::Double)
                .map_err(|_| malformed(kind, inner)),
            _ => Err(malformed(kind, inner)),
        },
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc)))
            .ok_or_else(|| malformed(kind, inner)),
        "stringValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_owned()))
            .ok_or_else(|| malformed(kind, inner)),
        "arrayValue" => {
            let values = inner.get("values").and_then(Value::as_array);
            values
                .map(|items| items.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .unwrap_or_else(|| Ok(Vec::new()))
                .map(FieldValue::Array)
        }
        "mapValue" => decode_fields(inner.get("fields")).map(FieldValue::Map),
        "geoPointValue" => {
            let coord = |name: &str| {
                inner
                    .get(name)
                    .and_then(Value::as_f64)
                    .map(FieldValue::Double)
                    .ok_or_else(|| malformed(kind, inner))
            };
            Ok(FieldValue::Map(Document::from([
                ("latitude".to_owned(), coord("latitude")?),
                ("longitude".to_owned(), coord("longitude")?),
            ])))
        }
        _ => Err(malformed("value type", raw)),
    }
}

/// Decode a document's `fields` object. An absent object is an empty document.
pub fn decode_fields(fields: Option<&Value>) -> Result<Document, StoreError> {
    let Some(fields) = fields else {
        return Ok(Document::new());
    };
    let Some(map) = fields.as_object() else {
        return Err(malformed("fields", fields));
    };
    map.iter()
        .map(|(k, v)| decode_value(v).map(|value| (k.clone(), value)))
        .collect()
}

/// Last segment of a document resource name
/// (`projects/p/databases/d/documents/chats/abc` → `abc`).
pub fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}

/// Field paths that are not plain identifiers must be backtick-quoted.
fn field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_owned()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn encode_filter(filter: &FieldFilter) -> Value {
    let field = json!({ "fieldPath": field_path(&filter.field) });
    match filter.value {
        FieldValue::Null => json!({ "unaryFilter": { "op": "IS_NULL", "field": field } }),
        _ => json!({
            "fieldFilter": {
                "field": field,
                "op": "EQUAL",
                "value": encode_value(&filter.value),
            }
        }),
    }
}

/// Body for `POST …/documents:runQuery`.
pub fn run_query_body(query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert(
        "from".into(),
        json!([{ "collectionId": query.collection }]),
    );

    match query.filters.as_slice() {
        [] => {}
        [single] => {
            structured.insert("where".into(), encode_filter(single));
        }
        many => {
            structured.insert(
                "where".into(),
                json!({
                    "compositeFilter": {
                        "op": "AND",
                        "filters": many.iter().map(encode_filter).collect::<Vec<_>>(),
                    }
                }),
            );
        }
    }

    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured.insert(
            "orderBy".into(),
            json!([{ "field": { "fieldPath": field_path(&order.field) }, "direction": direction }]),
        );
    }

    if let Some(limit) = query.limit {
        structured.insert("limit".into(), json!(limit));
    }

    json!({ "structuredQuery": structured })
}
