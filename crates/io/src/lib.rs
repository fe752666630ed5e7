// File I/O - parcel list import, result export

pub mod csv;
pub mod error;
pub mod json;
pub mod text;

pub use error::IoError;
pub use text::TextOptions;
