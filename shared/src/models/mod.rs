//! Domain models for the Restaurant Stock Management Platform

mod inventory;
mod movement;
mod order;
mod product;

pub use inventory::*;
pub use movement::*;
pub use order::*;
pub use product::*;
