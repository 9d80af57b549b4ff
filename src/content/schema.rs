//! Structured data (JSON-LD) merge
//!
//! The page template ships a LocalBusiness JSON-LD block; business details
//! from the content document are merged into it. Source fields that are
//! absent leave the template's values alone.

use serde_json::{json, Map, Value};

use super::document::Business;
use super::SchemaError;

/// JavaScript-style truthiness, used where an empty value means "unset"
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn or_empty(value: Option<&String>) -> Value {
    Value::String(value.cloned().unwrap_or_default())
}

/// Get `key` as an object, replacing a missing or non-object value
fn object_entry<'a>(schema: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let entry = schema
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    entry.as_object_mut()
}

/// Merge `business` into a parsed schema object
pub fn update_schema(schema: &mut Map<String, Value>, business: &Business) {
    let set_if_present = |schema: &mut Map<String, Value>, key: &str, value: Option<&String>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            schema.insert(key.to_string(), Value::String(v.clone()));
        }
    };
    set_if_present(schema, "name", business.name.as_ref());
    set_if_present(schema, "telephone", business.telephone.as_ref());
    set_if_present(schema, "url", business.url.as_ref());

    if let Some(address) = &business.address {
        if let Some(target) = object_entry(schema, "address") {
            target.insert("streetAddress".into(), or_empty(address.street_address.as_ref()));
            target.insert("addressLocality".into(), or_empty(address.locality.as_ref()));
            target.insert("postalCode".into(), or_empty(address.postal_code.as_ref()));
        }

        // Coordinates only travel together with a postal address
        if let Some(geo) = &business.geo {
            if let Some(target) = object_entry(schema, "geo") {
                let coord = |v: &Value| if truthy(v) { v.clone() } else { json!("") };
                target.insert("latitude".into(), coord(&geo.lat));
                target.insert("longitude".into(), coord(&geo.lng));
            }
        }
    }

    if let Some(hours) = &business.opening_hours {
        let spec: Vec<Value> = hours
            .iter()
            .map(|h| {
                json!({
                    "@type": "OpeningHoursSpecification",
                    "dayOfWeek": h.days,
                    "opens": h.opens,
                    "closes": h.closes,
                })
            })
            .collect();
        schema.insert("openingHoursSpecification".into(), Value::Array(spec));
    }
}

/// Merge into the JSON text of a `<script type="application/ld+json">`
/// block and return the replacement text, safe to embed in a script element
pub fn merge_schema_text(text: &str, business: Option<&Business>) -> Result<String, SchemaError> {
    let Value::Object(mut schema) = serde_json::from_str::<Value>(text)? else {
        return Err(SchemaError::NotAnObject);
    };
    if let Some(business) = business {
        update_schema(&mut schema, business);
    }
    let pretty = serde_json::to_string_pretty(&Value::Object(schema))?;
    Ok(pretty.replace("</", "<\\/"))
}
