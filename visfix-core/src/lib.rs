//! Embeddable core library for visfix.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into an editor integration, a CI runner, or any other host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`ProjectSource`](ports::ProjectSource): load projects and their documents
//! - [`WritePort`](ports::WritePort): write files and create directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_check`](pipeline::run_check): report findings without editing
//! - [`run_pass`](pipeline::run_pass): collect and apply one fix across every project
//! - [`Driver`](pipeline::Driver): the same, over projects already in memory

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export the cancellation token so hosts don't need visfix-types directly.
pub use visfix_types::cancel::CancelToken;
