//! Workspace facade crate.
//!
//! Re-exports the individual workspace crates so host applications can depend
//! on `radiopipe-workspace` without wiring each member crate individually.

pub use bridge_traits;
pub use core_pipeline;
pub use core_runtime;
