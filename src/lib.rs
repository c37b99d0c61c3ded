// src/lib.rs

//! HTTP endpoint security analysis.
//!
//! Fetch a target with [`core::http_client::HttpFetcher`], hand the snapshot
//! to [`core::analyze`], and render the resulting report with one of the
//! formatters in [`core::report`].

pub mod app;
pub mod config;
pub mod core;
pub mod logging;
