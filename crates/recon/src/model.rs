use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A parsed parcel area: either a finite number or something that is not one.
///
/// Text goes through [`AreaValue::parse`] once, up front, so nothing
/// downstream has to reason about `NaN` sentinels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaValue {
    Number(f64),
    Invalid,
}

impl AreaValue {
    /// Parse user-entered text. Surrounding whitespace is ignored; empty text,
    /// partial literals ("12abc") and non-finite values are `Invalid`.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Invalid;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Number(v),
            _ => Self::Invalid,
        }
    }

    /// The area if it can take part in reconciliation (finite and > 0).
    pub fn positive(&self) -> Option<f64> {
        match *self {
            Self::Number(v) if v.is_finite() && v > 0.0 => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for AreaValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

/// One sub-parcel as entered by the user. Labels are free-form and need not
/// be unique.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelInput {
    pub label: String,
    pub raw_area: AreaValue,
}

impl ParcelInput {
    pub fn new(label: impl Into<String>, raw_area: impl Into<AreaValue>) -> Self {
        Self {
            label: label.into(),
            raw_area: raw_area.into(),
        }
    }

    /// Build from raw text fields, parsing the area.
    pub fn from_text(label: &str, area: &str) -> Self {
        Self {
            label: label.to_string(),
            raw_area: AreaValue::parse(area),
        }
    }

    /// Inclusion test: trimmed label and area, or `None` if the row is dropped.
    pub fn included(&self) -> Option<(&str, f64)> {
        let label = self.label.trim();
        if label.is_empty() {
            return None;
        }
        self.raw_area.positive().map(|area| (label, area))
    }
}

/// Everything one reconciliation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationInputs {
    pub registered_area: f64,
    pub calculated_area: f64,
    pub parcels: Vec<ParcelInput>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub label: String,
    pub adjusted_area: f64,
    pub rounded_area: i64,
}

/// The reconciled table plus the tolerance verdict.
///
/// `total_rounded_area` is the sum of the per-row rounded values, not the
/// rounded `total_adjusted_area`; the two can differ by up to one unit per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub absolute_difference: f64,
    pub permissible_error: f64,
    pub exceeds_limit: bool,
    /// Factor actually applied to every row (`1.0` when the limit is exceeded).
    pub scale_factor: f64,
    pub rows: Vec<ResultRow>,
    pub total_adjusted_area: f64,
    pub total_rounded_area: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_numbers() {
        assert_eq!(AreaValue::parse("500"), AreaValue::Number(500.0));
        assert_eq!(AreaValue::parse("  12.5 "), AreaValue::Number(12.5));
        assert_eq!(AreaValue::parse("1e3"), AreaValue::Number(1000.0));
        assert_eq!(AreaValue::parse("-3"), AreaValue::Number(-3.0));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(AreaValue::parse(""), AreaValue::Invalid);
        assert_eq!(AreaValue::parse("   "), AreaValue::Invalid);
        assert_eq!(AreaValue::parse("12abc"), AreaValue::Invalid);
        assert_eq!(AreaValue::parse("abc"), AreaValue::Invalid);
        assert_eq!(AreaValue::parse("NaN"), AreaValue::Invalid);
        assert_eq!(AreaValue::parse("inf"), AreaValue::Invalid);
    }

    #[test]
    fn inclusion_needs_label_and_positive_area() {
        assert_eq!(ParcelInput::new(" 7 ", 10.0).included(), Some(("7", 10.0)));
        assert_eq!(ParcelInput::new("  ", 10.0).included(), None);
        assert_eq!(ParcelInput::new("1", 0.0).included(), None);
        assert_eq!(ParcelInput::new("1", -2.0).included(), None);
        assert_eq!(ParcelInput::new("1", f64::NAN).included(), None);
        assert_eq!(ParcelInput::new("1", f64::INFINITY).included(), None);
        assert_eq!(ParcelInput::from_text("1", "x").included(), None);
    }
}
