//! Shared test utilities for backlog integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Nothing here touches the network; on-disk fixtures live
//! in `tempfile` directories that are removed on drop.

pub mod assertions;
pub mod builders;
pub mod faults;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use faults::*;
pub use fixtures::*;
