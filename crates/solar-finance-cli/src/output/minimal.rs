use serde_json::Value;

use super::cell;

/// Headline fields in priority order. The first non-null one found in the
/// result (or its `summary`) is printed.
const PRIORITY_KEYS: [&str; 7] = [
    "net_cost",
    "monthly_payment",
    "best_offer",
    "total_eligible_value",
    "total_value",
    "payback_years",
    "effective_rate_pct",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Loan results nest the figures one level down
    let candidates = [
        result.get("summary"),
        result.get("amortization"),
        Some(result),
    ];

    for obj in candidates.into_iter().flatten() {
        for key in PRIORITY_KEYS {
            if let Some(val) = obj.get(key).filter(|v| !v.is_null()) {
                println!("{}", cell(val));
                return;
            }
        }
    }

    match result {
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, cell(val));
            }
        }
        Value::Array(arr) => println!("{} rows", arr.len()),
        _ => println!("{}", cell(result)),
    }
}
