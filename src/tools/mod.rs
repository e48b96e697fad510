//! Functions the realtime dialogue engine can call.

pub mod builtin;
pub mod registry;
pub mod tool;

pub use registry::{ToolDefinition, ToolRegistry};
pub use tool::*;
