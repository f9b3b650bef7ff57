//! Business logic services for the Restaurant Stock Management Platform

pub mod business_day;
pub mod catalog;
pub mod reporting;
pub mod stock;

pub use business_day::BusinessDayService;
pub use catalog::CatalogService;
pub use reporting::ReportingService;
pub use stock::StockService;
