use serde_json::Value;

/// Extracts the numeric value of a leaf record.
///
/// Returning `None` (missing field, wrong type) is not an error: the leaf counts as 0.
pub trait ValueAccessor {
    fn value(&self, record: &Value) -> Option<f64>;
}

impl<F> ValueAccessor for F
where
    F: Fn(&Value) -> Option<f64>,
{
    fn value(&self, record: &Value) -> Option<f64> {
        self(record)
    }
}

/// Reads a numeric field by name, e.g. `size` for the flare dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessor {
    field: String,
}

impl ValueAccessor for FieldAccessor {
    fn value(&self, record: &Value) -> Option<f64> {
        record.get(self.field.as_str()).and_then(json_f64)
    }
}

pub fn field(name: impl Into<String>) -> FieldAccessor {
    FieldAccessor { field: name.into() }
}

pub(crate) fn json_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_i64().map(|n| n as f64))
        .or_else(|| v.as_u64().map(|n| n as f64))
}

/// Coerces an accessor result into a usable leaf value.
pub(crate) fn leaf_value(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
