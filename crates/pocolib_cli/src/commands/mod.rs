//! CLI command implementations.

pub mod inspect;
pub mod rebuild;
pub mod search;
pub mod verify;
