//! Invocation contract for the function runtime.
//!
//! This crate owns the shapes exchanged at the invocation boundary: the
//! immutable [`request::Request`] handed to user function code, the stateless
//! [`response::Response`] factory the code builds results with, the
//! [`output::Output`] record handed back to the host, and the per-invocation
//! [`context::Context`] that bundles them with logging. It intentionally
//! excludes server, transport, and log persistence concerns; those live
//! behind the seams in `crates/faas_invoke_host`.

pub mod context;
pub mod error;
pub mod output;
pub mod request;
pub mod response;
