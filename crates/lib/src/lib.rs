//! tagdocs-lib: Core types and logic for tagdocs
//!
//! This crate builds documentation for a list of released versions, one version
//! at a time, each inside its own throwaway Python environment:
//! - `VersionTag`: the release being built
//! - `BuildEnvironment`: scoped virtualenv, removed on every exit path
//! - `SourceCheckout`: the source tree pinned to a tag (in-place or cloned)
//! - `VersionedDocBuilder`: the per-tag build-and-archive loop

pub mod archive;
pub mod builder;
pub mod checkout;
pub mod config;
pub mod consts;
pub mod docs;
pub mod environment;
pub mod error;
pub mod exec;
pub mod install;
pub mod log;
pub mod paths;
pub mod tag;
pub mod util;

pub use builder::{CyclePlan, FailurePolicy, RunReport, TagOutcome, TagStatus, VersionedDocBuilder};
pub use config::{BuildConfig, CheckoutMode};
pub use error::BuildError;
pub use tag::VersionTag;
