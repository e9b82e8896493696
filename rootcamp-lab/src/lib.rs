//! Lesson sandboxes and answer validation for RootCamp.
//!
//! A lesson declares the directory tree it needs. [`Materializer::create`]
//! builds that tree under a [`ScratchRoot`] and hands back a [`Sandbox`]
//! handle; the handle removes the tree when reaped or dropped, and the shared
//! [`ActiveSandboxRegistry`] lets an interrupt handler reap it too without
//! double deletion. [`validate_lesson`] judges a typed answer against the
//! lesson's requirements.

pub mod error;
pub mod lesson;
pub mod placeholders;
pub mod sandbox;
pub mod scratch;
pub mod validate;

pub use error::{ProvisionError, ReapError};
pub use lesson::{Lesson, LessonAbout, Requirement, SandboxSpec, ValidatorKind};
pub use sandbox::{ActiveSandboxRegistry, Materializer, Sandbox, get_start_path};
pub use scratch::ScratchRoot;
pub use validate::{NO_REQUIREMENTS_HINT, Validation, validate_lesson, validate_requirement};
