//! # lib-types
//!
//! Core type definitions shared across the magspec workspace.
//!
//! - Physical units with compile-time safety
//! - Uniformly sampled series carrying their time labels

pub mod error;
pub mod series;
pub mod units;

pub use error::{TypesError, TypesResult};
pub use series::*;
pub use units::*;
