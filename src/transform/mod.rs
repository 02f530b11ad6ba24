//! Table-agnostic row transforms used by every table builder

pub mod codes;
pub mod project;
pub mod remap;
pub mod rows;
pub mod sanitize;
pub mod timestamp;

pub use codes::{distinct_codes, CodeSlot, CodeSlots};
pub use project::{project, Rename};
pub use remap::{Remap, DESCENT, FALLBACK_LABEL};
pub use rows::RowSet;
pub use sanitize::{sanitize, SanitizeStats};
