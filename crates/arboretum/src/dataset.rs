use crate::format::{GroupedFormat, LabelFormatter, SiFormat};
use arboretum_core::{FieldAccessor, field};
use serde::{Deserialize, Serialize};

/// How a dataset's values are written in labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueStyle {
    #[default]
    Grouped,
    /// SI with billions, for dollar amounts.
    Currency,
}

/// Where a dataset's leaf values live and how to print them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    pub value_field: String,
    #[serde(default)]
    pub style: ValueStyle,
}

impl DatasetSpec {
    pub fn new(name: impl Into<String>, value_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_field: value_field.into(),
            style: ValueStyle::Grouped,
        }
    }

    pub fn with_style(mut self, style: ValueStyle) -> Self {
        self.style = style;
        self
    }

    /// The bundled datasets: animals, flare, sp500 and orchestras.
    pub fn known() -> Vec<DatasetSpec> {
        vec![
            DatasetSpec::new("animals", "species"),
            DatasetSpec::new("flare", "size"),
            DatasetSpec::new("sp500", "marketcap").with_style(ValueStyle::Currency),
            DatasetSpec::new("orchestras", "number"),
        ]
    }

    pub fn lookup(name: &str) -> Option<DatasetSpec> {
        Self::known()
            .into_iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn accessor(&self) -> FieldAccessor {
        field(self.value_field.as_str())
    }

    pub fn formatter(&self) -> Box<dyn LabelFormatter> {
        match self.style {
            ValueStyle::Grouped => Box::new(GroupedFormat),
            ValueStyle::Currency => Box::new(SiFormat::currency()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arboretum_core::ValueAccessor;
    use serde_json::json;

    #[test]
    fn known_datasets_resolve() {
        let sp = DatasetSpec::lookup("SP500").unwrap();
        assert_eq!(sp.value_field, "marketcap");
        assert_eq!(sp.formatter().format(3.1e9), "3.1B");

        let flare = DatasetSpec::lookup("flare").unwrap();
        assert_eq!(flare.accessor().value(&json!({"size": 12})), Some(12.0));
        assert_eq!(flare.formatter().format(12345.0), "12,345");

        assert!(DatasetSpec::lookup("unknown").is_none());
    }
}
