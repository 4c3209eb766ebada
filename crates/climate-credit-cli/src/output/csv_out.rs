use serde_json::Value;
use std::io;

/// Column prepended to summary rows so every sheet fits one CSV.
const SHEET_COLUMN: &str = "工作表";

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                if let Some(Value::Array(summaries)) = result.get("summaries") {
                    write_summaries_csv(&mut wtr, summaries);
                } else {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in result {
                        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                    }
                }
            }
            Some(Value::Array(results)) => write_array_csv(&mut wtr, results),
            _ => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        },
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Summary records of every sheet, headed by the first sheet's columns.
fn write_summaries_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, summaries: &[Value]) {
    let mut headers: Option<Vec<String>> = None;
    for summary in summaries {
        let sheet = summary
            .get("sheet_name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let Some(Value::Array(records)) = summary.get("records") else {
            continue;
        };
        for record in records {
            let Value::Object(map) = record else {
                continue;
            };
            let columns = headers.get_or_insert_with(|| {
                let columns: Vec<String> = map.keys().cloned().collect();
                let mut header_row = vec![SHEET_COLUMN.to_string()];
                header_row.extend(columns.iter().cloned());
                let _ = wtr.write_record(&header_row);
                columns
            });
            let mut row = vec![sheet.to_string()];
            row.extend(
                columns
                    .iter()
                    .map(|c| map.get(c).map(format_csv_value).unwrap_or_default()),
            );
            let _ = wtr.write_record(&row);
        }
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
