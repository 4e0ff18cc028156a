//! Response decoding for the NWIS services.
//!
//! - `timeseries`: WaterML-as-JSON from the `dv` and `iv` services
//! - `rdb`: tab-delimited RDB from the `site` service
//! - `fixtures` (test only): representative response payloads

pub mod rdb;
pub mod timeseries;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::model::{ResponseFormat, Result, SiteTable, TimeSeriesRecord};

/// A response decoded according to its declared format.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    TimeSeries(Vec<TimeSeriesRecord>),
    Table(SiteTable),
}

/// Dispatches raw response text to the parser for `format`.
pub fn parse_response(raw: &str, format: ResponseFormat) -> Result<ParsedResponse> {
    match format {
        ResponseFormat::Json => timeseries::parse_time_series(raw).map(ParsedResponse::TimeSeries),
        ResponseFormat::Rdb => rdb::parse_rdb(raw).map(ParsedResponse::Table),
    }
}
