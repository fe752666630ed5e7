use serde::Deserialize;

use crate::error::JobError;
use crate::model::{AreaValue, ParcelInput};

// ---------------------------------------------------------------------------
// Job file
// ---------------------------------------------------------------------------

/// A reconciliation described in TOML.
///
/// ```toml
/// name = "Lot 12"
/// registered_area = 1000.0
/// calculated_area = 998.0
/// parcels_file = "parcels.csv"
///
/// [[parcels]]
/// label = "1"
/// area = 500.0
/// ```
///
/// Area positivity is not checked here; the engine reports it as a
/// [`crate::DomainError`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconJob {
    #[serde(default)]
    pub name: Option<String>,
    pub registered_area: f64,
    pub calculated_area: f64,
    /// Parcel list file, resolved relative to the job file's directory.
    #[serde(default)]
    pub parcels_file: Option<String>,
    #[serde(default)]
    pub parcels: Vec<JobParcel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobParcel {
    pub label: JobText,
    #[serde(default)]
    pub area: Option<JobArea>,
}

/// Labels are usually parcel numbers; accept them bare or quoted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobText {
    Text(String),
    Integer(i64),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobArea {
    Number(f64),
    Text(String),
}

impl ReconJob {
    pub fn from_toml(s: &str) -> Result<Self, JobError> {
        let job: ReconJob = toml::from_str(s).map_err(|e| JobError::Parse(e.to_string()))?;
        job.validate()?;
        Ok(job)
    }

    fn validate(&self) -> Result<(), JobError> {
        if let Some(ref file) = self.parcels_file {
            if file.trim().is_empty() {
                return Err(JobError::Validation("parcels_file must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Inline `[[parcels]]` entries in file order.
    pub fn inline_parcels(&self) -> Vec<ParcelInput> {
        self.parcels.iter().map(JobParcel::to_input).collect()
    }

    /// Display name, falling back to "untitled".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("untitled")
    }
}

impl JobParcel {
    fn to_input(&self) -> ParcelInput {
        let label = match &self.label {
            JobText::Text(s) => s.clone(),
            JobText::Integer(n) => n.to_string(),
        };
        let raw_area = match &self.area {
            Some(JobArea::Number(v)) => AreaValue::Number(*v),
            Some(JobArea::Text(s)) => AreaValue::parse(s),
            None => AreaValue::Invalid,
        };
        ParcelInput { label, raw_area }
    }
}
