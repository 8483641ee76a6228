use serde_json::{Map, Value};
use std::io;

use super::cell;

/// Write output as CSV to stdout.
///
/// Arrays of rows become a header + row table. Envelopes become a
/// `field,value` listing with nested objects flattened to `parent.child`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Array(arr) => write_rows(&mut wtr, arr),
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let _ = wtr.write_record(["field", "value"]);
            write_fields(&mut wtr, "", body);
        }
        _ => {
            let _ = wtr.write_record([&cell(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, prefix: &str, map: &Map<String, Value>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => write_fields(wtr, &name, inner),
            // Row arrays do not fit a field/value listing
            Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {
                let _ = wtr.write_record([name.as_str(), &format!("[{} rows]", arr.len())]);
            }
            _ => {
                let _ = wtr.write_record([name.as_str(), &cell(val)]);
            }
        }
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&cell(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
