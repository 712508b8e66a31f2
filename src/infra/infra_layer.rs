// The infra module contains implementations of core traits.
// Each backend goes in its own submodule.

#[path = "google/mod.rs"]
pub mod google;

#[path = "forms/mod.rs"]
pub mod forms;
