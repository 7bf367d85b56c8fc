use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("record {0} is not an object")]
    NotAnObject(usize),
}

/// Serializes records to CSV text. The header is the union of keys across
/// all records in first-seen order; a record lacking a key gets an empty
/// field. No records means no output at all, header included.
pub fn to_csv<T: Serialize>(records: &[T]) -> Result<String, CsvError> {
    if records.is_empty() {
        return Ok(String::new());
    }
    let mut rows: Vec<Map<String, Value>> = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match serde_json::to_value(record)? {
            Value::Object(map) => rows.push(map),
            _ => return Err(CsvError::NotAnObject(index)),
        }
    }

    let mut headers: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in &rows {
        let fields: Vec<String> = headers
            .iter()
            .map(|header| row.get(*header).map(encode_field).unwrap_or_default())
            .collect();
        lines.push(fields.join(","));
    }
    Ok(lines.join("\n"))
}

fn encode_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => quote(text),
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");
            quote(&joined)
        }
        Value::Object(_) => quote(&value.to_string()),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
