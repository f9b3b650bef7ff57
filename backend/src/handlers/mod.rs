//! HTTP handlers for the Restaurant Stock Management Platform

mod catalog;
mod day;
mod health;
mod orders;
mod reporting;
mod stock;

pub use catalog::*;
pub use day::*;
pub use health::*;
pub use orders::*;
pub use reporting::*;
pub use stock::*;
