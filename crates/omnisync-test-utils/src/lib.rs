//! Shared test utilities for the OmniSync workspace.
//!
//! This crate provides project fixtures so that crate test suites do not
//! each rebuild the same directory layout. It is a dev-dependency only and
//! never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject) builder for an
//!   Unreal-style project plus an isolated settings root

pub mod project;

pub use project::TestProject;
