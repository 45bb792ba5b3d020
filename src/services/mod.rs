// Service layer: operations over AppState, shared by the CLI and tests.

pub mod actions;
pub mod dashboard;
pub mod updates;
