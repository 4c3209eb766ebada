pub mod file;
pub mod stdin;

use serde_json::{json, Value};

use climate_credit_core::portfolio::{Portfolio, PortfolioKind};

/// Load a portfolio from `--input` (JSON or CSV) or piped JSON.
///
/// A JSON document is either `{"kind": ..., "clients": [...]}` or a bare
/// array of client rows. `--kind` is required for CSV and bare arrays and
/// overrides the document's own kind.
pub fn read_portfolio(
    path: Option<&str>,
    kind: Option<PortfolioKind>,
) -> Result<Portfolio, Box<dyn std::error::Error>> {
    let document = match path {
        Some(path) if file::is_csv(path) => {
            let kind = kind.ok_or("--kind is required for CSV input")?;
            return into_portfolio(kind, Value::Array(file::read_csv_rows(path)?));
        }
        Some(path) => file::read_json_value(path)?,
        None => stdin::read_stdin()?
            .ok_or("--input file or piped JSON is required")?,
    };

    match document {
        Value::Array(rows) => {
            let kind = kind.ok_or("--kind is required when the input is a list of clients")?;
            into_portfolio(kind, Value::Array(rows))
        }
        Value::Object(mut map) => {
            if let Some(kind) = kind {
                map.insert("kind".into(), json!(kind));
            }
            if !map.contains_key("kind") {
                return Err("portfolio has no \"kind\"; pass --kind".into());
            }
            Ok(serde_json::from_value(Value::Object(map))?)
        }
        _ => Err("portfolio input must be a JSON object or array".into()),
    }
}

fn into_portfolio(kind: PortfolioKind, clients: Value) -> Result<Portfolio, Box<dyn std::error::Error>> {
    Ok(serde_json::from_value(json!({ "kind": kind, "clients": clients }))?)
}
