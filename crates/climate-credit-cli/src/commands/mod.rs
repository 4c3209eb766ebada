pub mod assess;
pub mod lookup;

use rust_decimal::Decimal;
use serde_json::Value;

/// Decimal as a normalized JSON string, `null` when not computable.
pub(crate) fn decimal_value(value: Option<Decimal>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.normalize().to_string()))
}
