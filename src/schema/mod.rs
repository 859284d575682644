//! Task schemas: template trees, the task registry, and the sanitizer that
//! forces any candidate value into a template's shape.

pub mod registry;
pub mod sanitize;
pub mod template;

pub use registry::{TaskId, TaskRegistry, TaskSchema};
pub use sanitize::{DriftStats, sanitize, sanitize_tracked};
pub use template::{GeneratorFn, NodeKind, TemplateNode};
