//! Pattern-based entity extraction.
//!
//! A fixed set of named regular expressions is applied to extracted text. This is
//! lexical matching only: there is no statistical model and no validation of
//! checksums or dates.

pub mod extractor;
pub mod registry;

pub use extractor::extract_entities;
pub use registry::{EntityPattern, EntityRegistry, PatternDefinition, PatternKind, builtin_definitions};
