//! Upstream API integration.
//!
//! - HTTP client + fetch state machine (`client`)
//! - payload schemas and shape adapters (`schema`)

pub mod client;
pub mod schema;

pub use client::{ApiClient, FetchHandle, FetchState, DEFAULT_BASE_URL};
pub use schema::decode_records;
