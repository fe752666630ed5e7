// Core types - the parcel form and its undo/redo history.
// Everything here sits outside the engine; `parcelgrid-recon` never sees it.

pub mod form;
pub mod history;

pub use form::{FormError, FormField, ParcelForm, ParcelRow};
pub use history::{History, DEFAULT_HISTORY_DEPTH};
