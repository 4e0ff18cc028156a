//! WaterML-as-JSON parsing for the daily values (`dv`) and instantaneous
//! values (`iv`) services.
//!
//! Both services return the same envelope; see `fixtures.rs` for annotated
//! examples of the response structure.
//!
//! Only the first block of `values[]` is read for each series. A series the
//! service splits into several blocks (for example one per method) yields
//! the first block's qualifiers and observations only. Downstream consumers
//! rely on that shape, so it is kept.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::model::{GeoLocation, NwisError, Observation, Result, TimeSeriesRecord};

// ---------------------------------------------------------------------------
// Serde structures for WaterML JSON deserialization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WaterMlResponse {
    value: ValueWrapper,
}

#[derive(Deserialize)]
struct ValueWrapper {
    #[serde(rename = "timeSeries")]
    time_series: Vec<TimeSeries>,
}

#[derive(Deserialize)]
struct TimeSeries {
    #[serde(rename = "sourceInfo")]
    source_info: SourceInfo,
    variable: Variable,
    values: Vec<Values>,
}

#[derive(Deserialize)]
struct SourceInfo {
    #[serde(rename = "siteName")]
    site_name: String,
    #[serde(rename = "siteCode")]
    site_code: Vec<SiteCode>,
    #[serde(rename = "timeZoneInfo")]
    time_zone_info: TimeZoneInfo,
    #[serde(rename = "geoLocation")]
    geo_location: GeoLocationWrapper,
}

#[derive(Deserialize)]
struct SiteCode {
    value: String,
}

#[derive(Deserialize)]
struct TimeZoneInfo {
    #[serde(rename = "defaultTimeZone")]
    default_time_zone: ZoneInfo,
}

#[derive(Deserialize)]
struct ZoneInfo {
    #[serde(rename = "zoneOffset")]
    zone_offset: String,
}

#[derive(Deserialize)]
struct GeoLocationWrapper {
    #[serde(rename = "geogLocation")]
    geog_location: GeogLocation,
}

#[derive(Deserialize)]
struct GeogLocation {
    #[serde(default)]
    srs: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct Variable {
    #[serde(rename = "variableCode", default)]
    variable_code: Vec<VariableCode>,
    #[serde(rename = "variableDescription")]
    variable_description: String,
    unit: Unit,
    #[serde(rename = "noDataValue", default)]
    no_data_value: Option<f64>,
}

#[derive(Deserialize)]
struct VariableCode {
    value: String,
}

#[derive(Deserialize)]
struct Unit {
    #[serde(rename = "unitCode")]
    unit_code: String,
}

#[derive(Deserialize)]
struct Values {
    value: Vec<ValueEntry>,
    qualifier: Vec<QualifierEntry>,
}

#[derive(Deserialize)]
struct ValueEntry {
    value: String, // USGS returns as string!
    #[serde(default)]
    qualifiers: Vec<String>,
    #[serde(rename = "dateTime")]
    date_time: String,
}

#[derive(Deserialize)]
struct QualifierEntry {
    #[serde(rename = "qualifierCode")]
    qualifier_code: String,
    #[serde(rename = "qualifierDescription")]
    qualifier_description: String,
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses a `dv` or `iv` JSON response body into one `TimeSeriesRecord` per
/// `timeSeries` entry, in response order.
///
/// An empty `timeSeries` array is a valid answer (no matching data) and
/// yields an empty list. Values are kept as the service's strings.
///
/// # Errors
/// `NwisError::MalformedResponse` when the body is not JSON, lacks
/// `value.timeSeries`, or a series lacks a field listed in
/// [`TimeSeriesRecord`] (site code, location, time zone, variable, or a
/// first values block).
pub fn parse_time_series(json: &str) -> Result<Vec<TimeSeriesRecord>> {
    let response: WaterMlResponse = serde_json::from_str(json)?;

    let records = response
        .value
        .time_series
        .into_iter()
        .enumerate()
        .map(|(index, series)| normalize_series(index, series))
        .collect::<Result<Vec<_>>>()?;

    let observations = observation_count(&records);
    if observations == 0 {
        warn!("{} time series, no data points found", records.len());
    } else {
        info!("{} time series, {} data points found", records.len(), observations);
    }
    Ok(records)
}

fn normalize_series(index: usize, series: TimeSeries) -> Result<TimeSeriesRecord> {
    let site_code = series
        .source_info
        .site_code
        .into_iter()
        .next()
        .ok_or_else(|| NwisError::MalformedResponse(format!("timeSeries[{}] has no siteCode", index)))?
        .value;

    if series.values.len() > 1 {
        debug!(
            "[{}] using first of {} values blocks",
            site_code,
            series.values.len()
        );
    }

    let first_block = series.values.into_iter().next().ok_or_else(|| {
        NwisError::MalformedResponse(format!(
            "timeSeries[{}] (site {}) has no values block",
            index, site_code
        ))
    })?;

    let qualifier_codes: BTreeMap<String, String> = first_block
        .qualifier
        .into_iter()
        .map(|q| (q.qualifier_code, q.qualifier_description))
        .collect();

    let observations = first_block
        .value
        .into_iter()
        .map(|entry| Observation {
            date_time: entry.date_time,
            value: entry.value,
            qualifiers: entry.qualifiers,
        })
        .collect();

    let geog = series.source_info.geo_location.geog_location;

    Ok(TimeSeriesRecord {
        site_code,
        site_name: series.source_info.site_name,
        location: GeoLocation {
            srs: geog.srs,
            latitude: geog.latitude,
            longitude: geog.longitude,
        },
        parameter_code: series.variable.variable_code.into_iter().next().map(|c| c.value),
        unit: series.variable.unit.unit_code,
        description: series.variable.variable_description,
        zone_offset: series.source_info.time_zone_info.default_time_zone.zone_offset,
        no_data_value: series.variable.no_data_value,
        qualifier_codes,
        observations,
    })
}

/// Total number of observations across all series. Diagnostic only.
pub fn observation_count(records: &[TimeSeriesRecord]) -> usize {
    records.iter().map(|r| r.observations.len()).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
