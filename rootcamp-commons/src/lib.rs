//! Shared helpers reused across the RootCamp crates.
//!
//! The lab, config, and storage crates all need to reason about paths that
//! must stay inside a root directory and about short random identifiers. Both
//! live here so the rules are defined once.

pub mod paths;
pub mod slug;

pub use paths::{PathEscape, canonicalize_existing, expand_home, normalize_path, resolve_within};
