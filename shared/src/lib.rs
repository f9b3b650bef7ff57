//! Shared types and domain logic for the Restaurant Stock Management Platform
//!
//! This crate contains the data model and the pure stock computations
//! (catalog graph, recipe explosion, availability evaluation, daily movement
//! arithmetic) shared between the backend and other components of the
//! system. Nothing in here touches the database.

pub mod availability;
pub mod bom;
pub mod catalog;
pub mod models;
pub mod types;
pub mod validation;

pub use availability::*;
pub use bom::*;
pub use catalog::*;
pub use models::*;
pub use types::*;
pub use validation::*;
