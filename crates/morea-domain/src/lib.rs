//! Domain types shared across the MOREA workspace.
//!
//! This crate contains only pure types and rules with no framework or
//! database dependencies.

pub mod access;
pub mod meter;
pub mod pagination;
