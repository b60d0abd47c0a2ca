//! Core types & traits: error model and the completion contract.

pub mod completion;
pub mod error;
