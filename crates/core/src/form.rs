//! The calculator form: parcel count, the two top-level areas and an editable
//! list of parcel rows, all kept as the raw text the user typed.

use std::fmt;

use parcelgrid_recon::{AreaValue, ParcelInput, ReconciliationInputs};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    RegisteredArea,
    CalculatedArea,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisteredArea => write!(f, "registered area"),
            Self::CalculatedArea => write!(f, "calculated area"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Please enter a valid number of parcels.")]
    InvalidParcelCount(String),

    #[error("{field}: '{value}' is not a number")]
    InvalidNumber { field: FormField, value: String },

    #[error("no parcel row with id {0}")]
    UnknownRow(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelRow {
    pub id: u64,
    pub label: String,
    pub area: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParcelForm {
    pub parcel_count: String,
    pub registered_area: String,
    pub calculated_area: String,
    pub rows: Vec<ParcelRow>,
    next_id: u64,
}

impl ParcelForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rows with `count` blank rows labelled 1..=count.
    pub fn generate(&mut self, count_text: &str) -> Result<(), FormError> {
        let count = match count_text.trim().parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return Err(FormError::InvalidParcelCount(count_text.to_string())),
        };

        self.parcel_count = count_text.trim().to_string();
        self.rows.clear();
        for i in 1..=count {
            self.push_row(i.to_string());
        }
        Ok(())
    }

    /// Append a blank row labelled with the next position. Returns its id.
    pub fn add_row(&mut self) -> u64 {
        let label = (self.rows.len() + 1).to_string();
        self.push_row(label)
    }

    pub fn remove_row(&mut self, id: u64) -> Result<ParcelRow, FormError> {
        let idx = self.index_of(id)?;
        Ok(self.rows.remove(idx))
    }

    pub fn set_label(&mut self, id: u64, text: &str) -> Result<(), FormError> {
        let idx = self.index_of(id)?;
        self.rows[idx].label = text.to_string();
        Ok(())
    }

    pub fn set_area(&mut self, id: u64, text: &str) -> Result<(), FormError> {
        let idx = self.index_of(id)?;
        self.rows[idx].area = text.to_string();
        Ok(())
    }

    pub fn row(&self, id: u64) -> Option<&ParcelRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Parse the form into engine inputs.
    ///
    /// Only the two top-level fields can fail here; bad row areas become
    /// [`AreaValue::Invalid`] and are dropped by the engine.
    pub fn to_inputs(&self) -> Result<ReconciliationInputs, FormError> {
        let registered_area = parse_field(FormField::RegisteredArea, &self.registered_area)?;
        let calculated_area = parse_field(FormField::CalculatedArea, &self.calculated_area)?;
        let parcels = self
            .rows
            .iter()
            .map(|r| ParcelInput::from_text(&r.label, &r.area))
            .collect();

        Ok(ReconciliationInputs {
            registered_area,
            calculated_area,
            parcels,
        })
    }

    fn push_row(&mut self, label: String) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.rows.push(ParcelRow {
            id,
            label,
            area: String::new(),
        });
        id
    }

    fn index_of(&self, id: u64) -> Result<usize, FormError> {
        self.rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(FormError::UnknownRow(id))
    }
}

fn parse_field(field: FormField, text: &str) -> Result<f64, FormError> {
    match AreaValue::parse(text) {
        AreaValue::Number(v) => Ok(v),
        AreaValue::Invalid => Err(FormError::InvalidNumber {
            field,
            value: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;

    #[test]
    fn generate_labels_rows_in_order() {
        let mut form = ParcelForm::new();
        form.generate(" 3 ").unwrap();
        let labels: Vec<&str> = form.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["1", "2", "3"]);
        assert!(form.rows.iter().all(|r| r.area.is_empty()));
        assert_eq!(form.parcel_count, "3");
    }

    #[test]
    fn generate_rejects_bad_counts() {
        let mut form = ParcelForm::new();
        for bad in ["0", "-2", "abc", "", "2.5"] {
            let err = form.generate(bad).unwrap_err();
            assert_eq!(err.to_string(), "Please enter a valid number of parcels.");
        }
        assert!(form.rows.is_empty());
    }

    #[test]
    fn generate_replaces_existing_rows() {
        let mut form = ParcelForm::new();
        form.generate("4").unwrap();
        form.generate("2").unwrap();
        assert_eq!(form.rows.len(), 2);
        assert_eq!(form.rows[1].label, "2");
    }

    #[test]
    fn add_and_remove_rows() {
        let mut form = ParcelForm::new();
        form.generate("2").unwrap();
        let first = form.rows[0].id;
        let added = form.add_row();
        assert_eq!(form.row(added).unwrap().label, "3");

        let removed = form.remove_row(first).unwrap();
        assert_eq!(removed.label, "1");
        assert_eq!(form.rows.len(), 2);
        // Ids are never reused within a form.
        let again = form.add_row();
        assert!(again > added);
        assert_eq!(form.row(again).unwrap().label, "3");

        assert_eq!(form.remove_row(999), Err(FormError::UnknownRow(999)));
    }

    #[test]
    fn to_inputs_parses_top_level_fields() {
        let mut form = ParcelForm::new();
        form.generate("2").unwrap();
        form.registered_area = "1000".into();
        form.calculated_area = " 998 ".into();
        let id = form.rows[0].id;
        form.set_area(id, "500").unwrap();

        let inputs = form.to_inputs().unwrap();
        assert_eq!(inputs.registered_area, 1000.0);
        assert_eq!(inputs.calculated_area, 998.0);
        assert_eq!(inputs.parcels[0], ParcelInput::new("1", 500.0));
        assert_eq!(inputs.parcels[1].raw_area, AreaValue::Invalid);

        form.calculated_area = "n/a".into();
        assert_eq!(
            form.to_inputs(),
            Err(FormError::InvalidNumber {
                field: FormField::CalculatedArea,
                value: "n/a".into(),
            })
        );
    }

    #[test]
    fn snapshots_restore_edits() {
        let mut form = ParcelForm::new();
        let mut history = History::new();
        history.record(form.clone());

        form.generate("2").unwrap();
        history.record(form.clone());
        let id = form.rows[0].id;
        form.set_label(id, "A").unwrap();
        history.record(form.clone());

        form = history.undo().cloned().unwrap();
        assert_eq!(form.rows[0].label, "1");
        form = history.undo().cloned().unwrap();
        assert!(form.rows.is_empty());
        form = history.redo().cloned().unwrap();
        assert_eq!(form.rows.len(), 2);
    }
}
