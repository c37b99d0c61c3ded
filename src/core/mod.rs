// src/core/mod.rs

/// Typed errors for input validation, transport and report rendering.
pub mod error;

/// The HTTP client adapter that turns a request into a `ResponseSnapshot`.
pub mod http_client;

/// The static rule catalog: security headers, disclosure headers and body
/// patterns the engine checks for.
pub mod knowledge_base;

/// Request, response, finding and report types.
pub mod models;

/// Text and JSON renderers for `SecurityReport`.
pub mod report;

/// The analysis engine.
pub mod scanner;

pub use scanner::{analyze, analyze_with};
