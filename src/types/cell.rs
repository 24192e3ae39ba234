use serde::{Deserialize, Serialize};

/// A decoded cell value as it comes out of an import adapter.
///
/// The grid itself stores only strings; this variant exists so decoders can
/// say what they found, and [`RawValue::into_text`] fixes the single string
/// form used for display and filter matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "t", content = "v", rename_all = "camelCase")]
pub enum RawValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet error literal such as `#N/A`.
    Error(String),
}

impl RawValue {
    /// Canonical string form. Whole numbers print without a fraction
    /// (`25.0` → `"25"`), booleans as `TRUE`/`FALSE`.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) | Self::Error(s) => s,
            Self::Number(n) => format!("{n}"),
            Self::Bool(true) => "TRUE".into(),
            Self::Bool(false) => "FALSE".into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
