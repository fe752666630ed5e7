//! `parcelgrid-recon`: parcel area reconciliation engine.
//!
//! Pure engine crate: receives a registered area, a calculated area and a list
//! of sub-parcel areas, returns the reconciled table. No CLI or IO dependencies.

pub mod engine;
pub mod error;
pub mod job;
pub mod model;
pub mod tolerance;

pub use engine::{reconcile, reconcile_inputs};
pub use error::{DomainError, JobError};
pub use job::ReconJob;
pub use model::{AreaValue, ParcelInput, ReconciliationInputs, ReconciliationResult, ResultRow};
pub use tolerance::{exceeds_limit, permissible_error};
