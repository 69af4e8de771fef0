//! Aggregation and transform pipeline behind the COVID-19 panels.
//!
//! Records flow one way: scope filter, per-date aggregation, method and
//! rolling-average transforms, then cobweb pairing. Each [`panel::Panel`]
//! reruns that chain synchronously whenever one of its parameters changes.

pub mod aggregate;
pub mod cache;
pub mod cobweb;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod panel;
pub mod report;
pub mod scope;
pub mod store;
pub mod transform;

pub use error::{DashboardError, Result};
