//! Warranty record and extraction output types.
//!
//! The model is asked for eight named fields but nothing forces it to comply:
//! it may return numbers where strings were expected, the literal string
//! `"null"`, an object for `contact_info`, or extra keys nobody asked for.
//! [`WarrantyRecord`] accepts all of that. Textual fields are read leniently
//! and anything unrecognised is carried through untouched in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Structured warranty fields extracted from one document.
///
/// Serialising always emits all eight named fields, using `null` for
/// anything absent, followed by any extra keys the model produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarrantyRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serial_number: Option<String>,
    /// `DD-MM-YYYY`
    #[serde(default, deserialize_with = "lenient_string")]
    pub purchase_date: Option<String>,
    /// Free text, e.g. "2 years" or "6 months".
    #[serde(default, deserialize_with = "lenient_string")]
    pub warranty_period: Option<String>,
    /// `DD-MM-YYYY`; backfilled from the two fields above when missing.
    #[serde(default, deserialize_with = "lenient_string")]
    pub expiry_date: Option<String>,
    /// Phone, email or address. Models return either a string or an object.
    #[serde(default, deserialize_with = "lenient_value")]
    pub contact_info: Option<Value>,
    /// Keys outside the requested schema, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Successful result of one extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// Path of the JSON file the record was written to.
    pub file_saved: PathBuf,
    /// The final record, after expiry backfill.
    pub data: WarrantyRecord,
}

/// Treat `null`, `"null"`, `"None"` and blank strings as missing.
fn is_missing(s: &str) -> bool {
    let t = s.trim();
    t.is_empty() || t.eq_ignore_ascii_case("null") || t == "None"
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if is_missing(&s) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if is_missing(&s) => None,
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_serialise_as_null() {
        let record: WarrantyRecord = serde_json::from_value(json!({ "product": "Kettle" })).unwrap();
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["product"], "Kettle");
        for key in [
            "name",
            "model_number",
            "serial_number",
            "purchase_date",
            "warranty_period",
            "expiry_date",
            "contact_info",
        ] {
            assert!(out[key].is_null(), "{key} should be null, got {}", out[key]);
        }
    }

    #[test]
    fn null_string_is_missing() {
        let record: WarrantyRecord =
            serde_json::from_value(json!({ "expiry_date": "null", "name": "  " })).unwrap();
        assert_eq!(record.expiry_date, None);
        assert_eq!(record.name, None);
    }

    #[test]
    fn numbers_become_strings() {
        let record: WarrantyRecord =
            serde_json::from_value(json!({ "serial_number": 123456, "model_number": "X-1" })).unwrap();
        assert_eq!(record.serial_number.as_deref(), Some("123456"));
        assert_eq!(record.model_number.as_deref(), Some("X-1"));
    }

    #[test]
    fn contact_object_and_extra_keys_survive() {
        let input = json!({
            "contact_info": { "phone": "1800-123", "email": "care@example.com" },
            "retailer": "Acme Stores"
        });
        let record: WarrantyRecord = serde_json::from_value(input).unwrap();
        assert_eq!(record.contact_info.as_ref().unwrap()["phone"], "1800-123");
        assert_eq!(record.extra["retailer"], "Acme Stores");

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["retailer"], "Acme Stores");
        assert_eq!(out["contact_info"]["email"], "care@example.com");
    }
}
