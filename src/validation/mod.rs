//! Input validation
//!
//! Field-level checks for incoming records and the name/id reconciliation
//! used when a record references a teacher or a class.

pub mod fields;
pub mod reference;

pub use fields::{is_valid_email, require_fields, require_valid_email};
pub use reference::{resolve_reference, ReferenceLookup, ResolveError, SqlReferenceTable};
