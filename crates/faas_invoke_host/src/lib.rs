//! Host-side adapters and handlers for the invocation contract.
//!
//! This crate owns runtime integration details (event normalization, the
//! invocation driver, and log sink adapters) on top of the pure contract in
//! `crates/faas_invoke_core`. The fronting HTTP server, process lifecycle,
//! and response transport stay outside this workspace; they plug in at the
//! seams exposed here.

pub mod adapters;
pub mod handlers;
