//! HEXCONQUEST CLI commands, exposed for integration tests

pub mod batch;
pub mod replay_cmd;
pub mod simulate;
