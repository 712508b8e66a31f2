// The core module contains the quiz workflow logic and the traits it talks through.
// It knows nothing about HTTP; `infra/` provides the implementations.

#[path = "forms/mod.rs"]
pub mod forms;
