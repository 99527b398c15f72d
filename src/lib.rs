//! Authenticated HTTP client for the DataGraphs API.
//!
//! [`DataGraphsClient`] builds project-scoped requests, attaches the API key and,
//! when delegated-auth credentials are configured, a bearer token served from a
//! per-client [`token::TokenCache`]. Failed responses surface as [`ApiError`].

mod client;
pub mod config;
pub mod errors;
pub mod ids;
pub mod response;
pub mod telemetry;
pub mod token;

pub use client::{DataGraphsClient, Query, RequestOptions};
pub use config::{Config, ConfigLocation, Environment, read_config};
pub use errors::{ApiError, Error};

#[cfg(test)]
mod tests;
