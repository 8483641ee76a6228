use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::cell;

/// Print a computation envelope (or a bare array of rows) as tables.
///
/// Nested objects in the result, such as the investment summary, get their
/// own Field/Value table; arrays of objects (schedules, offers, incentive
/// results) get a column table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_sections(result);
                print_envelope_notes(map);
            }
            _ => print_field_table(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_sections(result: &Map<String, Value>) {
    let (scalars, nested): (Vec<_>, Vec<_>) = result
        .iter()
        .partition(|(_, v)| !v.is_object() && !is_row_array(v));

    if !scalars.is_empty() {
        let flat: Map<String, Value> = scalars
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        print_field_table(&flat);
    }

    for (key, val) in nested {
        println!("\n{}:", key);
        match val {
            Value::Object(obj) => print_field_table(obj),
            Value::Array(arr) => print_rows(arr),
            _ => {}
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(|w| w.as_str()) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(flatten_row_cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

/// Incentive results embed the whole rule; show just its name.
fn flatten_row_cell(value: &Value) -> String {
    match value {
        Value::Object(obj) => obj
            .get("name")
            .or_else(|| obj.get("id"))
            .map(cell)
            .unwrap_or_else(|| cell(value)),
        _ => cell(value),
    }
}

fn is_row_array(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if arr.first().is_some_and(Value::is_object))
}
