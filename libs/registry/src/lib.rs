//! # Signal Registry
//!
//! Static catalog of every known vehicle signal and the validation /
//! transformation pipeline applied on writes.
//!
//! The catalog is declarative data: one [`SignalDefinition`] per signal name
//! carrying the default value, the accept/reject rule, the optional
//! normalization step and the writability flag. It is built once at process
//! start and looked up by name for the lifetime of the process — there is
//! no runtime reflection or dynamic property discovery involved.
//!
//! ## Write pipeline
//!
//! ```text
//! raw value → rule.check() → Transform::apply() → canonical SignalValue
//! ```
//!
//! Validation failures carry the human-readable message surfaced verbatim
//! to the caller; transformation only runs on accepted values and is total.

pub mod catalog;
pub mod definition;
pub mod validate;

pub use catalog::{is_valid_name, normalize_name, SignalRegistry};
pub use definition::{AccessContext, AccessHook, SignalDefinition, ValidationError};
pub use validate::{parse_float_lenient, Transform, ValidationRule};
