//! Core library for the golden-tools command line application.
//!
//! The library reshapes resource cost fixtures so they follow the layout of
//! their golden reports. Golden report parsing lives in [`report`], the data
//! representations in [`model`], the reshaping logic in [`reconcile`], and the
//! file and directory orchestration in [`fix`].

pub mod error;
pub mod fix;
pub mod model;
pub mod reconcile;
pub mod report;

pub use error::{Result, ToolError};
