//! Record module - one row of extracted data

use serde_json::{Map, Value};

/// One extracted record: an open mapping from field name to a scalar value
///
/// The field set is not fixed. It is decided by the extraction goal and by
/// whatever the oracle returns.
pub type Record = Map<String, Value>;

/// Collect the union of field names over a record sequence
///
/// Field order follows first appearance: the oracle's key order within a
/// record, then new keys from later records. Table columns stay stable
/// across chunks of the same document.
pub fn field_names(records: &[Record]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
    }
    names
}

/// Render a scalar field value as display text
///
/// Strings are returned without quotes, null becomes an empty string and
/// anything else uses its JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_field_names_first_appearance_order() {
        let records = vec![
            record(json!({"name": "a", "code": "007"})),
            record(json!({"amount": 3, "name": "b"})),
        ];
        assert_eq!(field_names(&records), vec!["name", "code", "amount"]);
    }

    #[test]
    fn test_field_names_keep_unsorted_key_order() {
        let records: Vec<Record> =
            serde_json::from_str(r#"[{"zip": "02139", "city": "Cambridge", "amount": 1}]"#)
                .unwrap();
        assert_eq!(field_names(&records), vec!["zip", "city", "amount"]);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("007")), "007");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!(12.5)), "12.5");
        assert_eq!(display_value(&json!(true)), "true");
    }
}
