//! nwis_client: a client for the USGS National Water Information System
//! (NWIS) water services.
//!
//! # Module structure
//!
//! ```text
//! nwis_client
//! ├── model       — shared data types (MajorFilter, Query, TimeSeriesRecord, NwisError, …)
//! ├── config      — client configuration (defaults, nwis.toml, NWIS_* environment)
//! ├── timestamps  — NWIS ISO 8601 timestamp parsing
//! ├── query       — request URL construction and form encoding
//! ├── transport   — blocking HTTP GET, gzip and charset decoding
//! ├── ingest
//! │   ├── timeseries — dv/iv WaterML-as-JSON parsing
//! │   ├── rdb        — site service RDB parsing
//! │   └── fixtures (test only) — representative API response payloads
//! ├── analysis
//! │   └── core_data  — flattens time series into analysis-ready records
//! └── client      — query objects with a memoized raw response
//! ```
//!
//! Diagnostics go through the `log` facade under each module's path
//! (`nwis_client::query`, `nwis_client::transport`, `nwis_client::client`,
//! `nwis_client::ingest::*`). Install any `log` backend to see them.

pub mod analysis;
pub mod client;
pub mod config;
pub mod ingest;
pub mod model;
pub mod query;
pub mod timestamps;
pub mod transport;

pub use client::{ResponseCache, SitesQuery, TimeSeriesQuery};
pub use config::ClientConfig;
pub use model::{
    CoreRecord, MajorFilter, NwisError, ParamValue, Query, QueryParams, ResponseFormat, Result, Service,
    SiteRecord, SiteTable, TimeSeriesRecord,
};
