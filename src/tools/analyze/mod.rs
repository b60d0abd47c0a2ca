//! Image analysis tools: prompt contract, reply decoding, the adapter, and
//! the MCP tool router exposing it.

pub mod analyzer;
pub mod prompt;
pub mod reply;
pub mod tool_router;

pub use analyzer::ImageAnalyzer;
pub use tool_router::{AnalyzeRouter, AnalyzeSvc};
