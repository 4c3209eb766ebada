use serde_json::Value;

/// Print just the key answer from the output.
///
/// Assessments print one line per summary sheet with its expected-loss
/// totals. Otherwise look for well-known result fields, then fall back to
/// the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(summaries)) = result_obj.get("summaries") {
        for summary in summaries {
            println!("{}", summary_line(summary));
        }
        return;
    }

    let priority_keys = ["grade", "collateral_value", "ead"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

/// `sheet  group=EL  group=EL ...`
fn summary_line(summary: &Value) -> String {
    let mut parts = vec![summary
        .get("sheet_name")
        .map(format_minimal)
        .unwrap_or_default()];
    if let Some(Value::Object(losses)) = summary.pointer("/totals/expected_loss") {
        for (group, loss) in losses {
            parts.push(format!("{}={}", group, format_minimal(loss)));
        }
    }
    parts.join("\t")
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
