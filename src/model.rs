//! Core data types for the NWIS water services client.
//!
//! This module defines the shared domain model imported by all other modules:
//! the query descriptor (major filter, service, format, secondary parameters),
//! the normalized parse results, and the crate error type. It contains no I/O.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::timestamps::{parse_usgs_datetime, UsgsTimestamp};

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// USGS parameter code for gage height (stage), in feet.
pub const PARAM_STAGE: &str = "00065";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Result type alias for NWIS client operations.
pub type Result<T> = std::result::Result<T, NwisError>;

/// Errors that can arise when building, fetching or parsing NWIS queries.
#[derive(Debug, Error)]
pub enum NwisError {
    /// Invalid, absent or multiple major filters, or an unusable parameter.
    /// Raised before any network access.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure reported by the transport, passed through untouched.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-2xx HTTP response from the water services host. `body` holds the
    /// start of the response text, where the service explains the refusal.
    #[error("HTTP error: {status} for {url}: {body}")]
    HttpStatus { status: u16, url: String, body: String },

    /// The response body is missing fields the parser requires.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for NwisError {
    fn from(err: reqwest::Error) -> Self {
        NwisError::Transport(Box::new(err))
    }
}

impl From<std::io::Error> for NwisError {
    fn from(err: std::io::Error) -> Self {
        NwisError::Transport(Box::new(err))
    }
}

impl From<serde_json::Error> for NwisError {
    fn from(err: serde_json::Error) -> Self {
        NwisError::MalformedResponse(format!("JSON deserialization failed: {}", err))
    }
}

impl From<toml::de::Error> for NwisError {
    fn from(err: toml::de::Error) -> Self {
        NwisError::Configuration(format!("invalid client configuration: {}", err))
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// A single query parameter value.
///
/// Lists are rendered as one comma-joined value (`sites=a,b,c`), never as a
/// repeated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Builds a list value from anything displayable.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        ParamValue::List(items.into_iter().map(|item| item.to_string()).collect())
    }

    /// The value as it appears in the query string, before form encoding.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Scalar(value) => value.clone(),
            ParamValue::List(items) => items.join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        ParamValue::List(items)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(items: Vec<&str>) -> Self {
        ParamValue::list(items)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(items: &[&str]) -> Self {
        ParamValue::list(items)
    }
}

/// Secondary query parameters (`startDT`, `endDT`, `parameterCd`, …).
///
/// Keeps insertion order. Inserting an existing key replaces its value but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`QueryParams::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Major filter
// ---------------------------------------------------------------------------

/// The single site-selection criterion every NWIS query must carry.
///
/// Being an enum, a `MajorFilter` always holds exactly one filter. Untyped
/// key/value input goes through [`MajorFilter::from_pairs`], which rejects
/// zero, several, or unknown keys.
#[derive(Debug, Clone, PartialEq)]
pub enum MajorFilter {
    /// `sites`: specific site numbers.
    Sites(Vec<String>),
    /// `stateCd`: two-letter state code, e.g. `"ny"`.
    StateCode(String),
    /// `huc`: hydrologic unit codes.
    HucCodes(Vec<String>),
    /// `bBox`: west, south, east, north in decimal degrees.
    BoundingBox {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    },
    /// `countyCd`: county FIPS codes.
    CountyCodes(Vec<String>),
}

impl MajorFilter {
    /// Query-string keys accepted as a major filter.
    pub const ALLOWED_KEYS: [&'static str; 5] = ["sites", "stateCd", "huc", "bBox", "countyCd"];

    pub fn sites<I, T>(sites: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        MajorFilter::Sites(sites.into_iter().map(Into::into).collect())
    }

    /// The query-string key this filter renders under.
    pub fn key(&self) -> &'static str {
        match self {
            MajorFilter::Sites(_) => "sites",
            MajorFilter::StateCode(_) => "stateCd",
            MajorFilter::HucCodes(_) => "huc",
            MajorFilter::BoundingBox { .. } => "bBox",
            MajorFilter::CountyCodes(_) => "countyCd",
        }
    }

    /// The filter's value, ready to merge into the query parameters.
    pub fn value(&self) -> ParamValue {
        match self {
            MajorFilter::Sites(codes) | MajorFilter::HucCodes(codes) | MajorFilter::CountyCodes(codes) => {
                ParamValue::List(codes.clone())
            }
            MajorFilter::StateCode(code) => ParamValue::Scalar(code.clone()),
            MajorFilter::BoundingBox { west, south, east, north } => {
                ParamValue::list([west, south, east, north])
            }
        }
    }

    /// Rejects filters the service would refuse: empty code lists, a blank
    /// state code, or a bounding box with non-finite or inverted corners.
    pub fn validate(&self) -> Result<()> {
        match self {
            MajorFilter::Sites(codes) | MajorFilter::HucCodes(codes) | MajorFilter::CountyCodes(codes) => {
                if codes.is_empty() {
                    return Err(NwisError::Configuration(format!(
                        "major filter '{}' needs at least one code",
                        self.key()
                    )));
                }
                if codes.iter().any(|c| c.trim().is_empty()) {
                    return Err(NwisError::Configuration(format!(
                        "major filter '{}' contains a blank code",
                        self.key()
                    )));
                }
                Ok(())
            }
            MajorFilter::StateCode(code) => {
                if code.trim().is_empty() {
                    return Err(NwisError::Configuration("major filter 'stateCd' is blank".to_string()));
                }
                Ok(())
            }
            MajorFilter::BoundingBox { west, south, east, north } => {
                let corners = [west, south, east, north];
                if corners.iter().any(|c| !c.is_finite()) {
                    return Err(NwisError::Configuration(
                        "major filter 'bBox' corners must be finite numbers".to_string(),
                    ));
                }
                if west > east || south > north {
                    return Err(NwisError::Configuration(format!(
                        "major filter 'bBox' must be west,south,east,north; got {},{},{},{}",
                        west, south, east, north
                    )));
                }
                Ok(())
            }
        }
    }

    /// Builds a filter from untyped key/value pairs.
    ///
    /// Exactly one pair is required, and its key must be one of
    /// [`MajorFilter::ALLOWED_KEYS`].
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, ParamValue)>,
        K: AsRef<str>,
    {
        let pairs: Vec<(K, ParamValue)> = pairs.into_iter().collect();
        let allowed = Self::ALLOWED_KEYS.join(", ");

        let (key, value) = match pairs.as_slice() {
            [single] => single,
            [] => {
                return Err(NwisError::Configuration(format!(
                    "a major filter is required; must be one of: {}",
                    allowed
                )));
            }
            _ => {
                return Err(NwisError::Configuration(format!(
                    "only one major filter is allowed, got {}; must be one of: {}",
                    pairs.len(),
                    allowed
                )));
            }
        };

        let filter = match key.as_ref() {
            "sites" => MajorFilter::Sites(value_as_list(value)),
            "stateCd" => MajorFilter::StateCode(value.render()),
            "huc" => MajorFilter::HucCodes(value_as_list(value)),
            "countyCd" => MajorFilter::CountyCodes(value_as_list(value)),
            "bBox" => parse_bounding_box(value)?,
            other => {
                return Err(NwisError::Configuration(format!(
                    "unknown major filter '{}'; must be one of: {}",
                    other, allowed
                )));
            }
        };

        filter.validate()?;
        Ok(filter)
    }
}

impl fmt::Display for MajorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key(), self.value().render())
    }
}

/// A scalar `"a,b"` and a list `["a", "b"]` name the same codes.
fn value_as_list(value: &ParamValue) -> Vec<String> {
    match value {
        ParamValue::List(items) => items.clone(),
        ParamValue::Scalar(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
    }
}

fn parse_bounding_box(value: &ParamValue) -> Result<MajorFilter> {
    let parts = value_as_list(value);
    let corners: Vec<f64> = parts
        .iter()
        .map(|p| {
            p.parse::<f64>().map_err(|e| {
                NwisError::Configuration(format!("bBox corner '{}' is not a number: {}", p, e))
            })
        })
        .collect::<Result<_>>()?;

    match corners.as_slice() {
        &[west, south, east, north] => Ok(MajorFilter::BoundingBox { west, south, east, north }),
        _ => Err(NwisError::Configuration(format!(
            "bBox needs 4 values (west,south,east,north), got {}",
            corners.len()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Service and format
// ---------------------------------------------------------------------------

/// NWIS web service endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// `dv`: one value per day.
    DailyValues,
    /// `iv`: recorded-interval values (typically 15 minutes).
    Instantaneous,
    /// `site`: site metadata.
    Sites,
}

impl Service {
    /// Path segment under `/nwis/`.
    pub fn segment(&self) -> &'static str {
        match self {
            Service::DailyValues => "dv",
            Service::Instantaneous => "iv",
            Service::Sites => "site",
        }
    }

    /// The format the client requests from this service. The site service
    /// offers no JSON.
    pub fn default_format(&self) -> ResponseFormat {
        match self {
            Service::DailyValues | Service::Instantaneous => ResponseFormat::Json,
            Service::Sites => ResponseFormat::Rdb,
        }
    }

    /// `strftime` pattern for `startDT`/`endDT` on this service.
    pub fn date_format(&self) -> &'static str {
        match self {
            Service::Instantaneous => "%Y-%m-%dT%H:%M",
            Service::DailyValues | Service::Sites => "%Y-%m-%d",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Response encodings the client knows how to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    /// WaterML rendered as JSON.
    Json,
    /// Tab-delimited RDB.
    Rdb,
}

impl ResponseFormat {
    /// Value of the `format` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Rdb => "rdb",
        }
    }
}

// ---------------------------------------------------------------------------
// Query descriptor
// ---------------------------------------------------------------------------

/// An immutable description of one NWIS request.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    filter: MajorFilter,
    service: Service,
    format: ResponseFormat,
    params: QueryParams,
}

impl Query {
    /// Validates the filter and fixes the format to the service's default.
    pub fn new(filter: MajorFilter, service: Service, params: QueryParams) -> Result<Self> {
        filter.validate()?;
        Ok(Self {
            filter,
            service,
            format: service.default_format(),
            params,
        })
    }

    /// Daily or instantaneous values for a list of sites over a date range.
    ///
    /// Dates render as `YYYY-MM-DD` for daily values and `YYYY-MM-DDTHH:MM`
    /// for instantaneous values. `parameter_cd` defaults to discharge.
    pub fn by_sites<I, T>(
        sites: I,
        service: Service,
        start: NaiveDateTime,
        end: NaiveDateTime,
        parameter_cd: Option<&str>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if service == Service::Sites {
            return Err(NwisError::Configuration(
                "the site service does not serve time series".to_string(),
            ));
        }
        if start > end {
            return Err(NwisError::Configuration(format!(
                "start {} is after end {}",
                start, end
            )));
        }

        let pattern = service.date_format();
        let params = QueryParams::new()
            .with("startDT", start.format(pattern).to_string())
            .with("endDT", end.format(pattern).to_string())
            .with("parameterCd", parameter_cd.unwrap_or(PARAM_DISCHARGE));

        Self::new(MajorFilter::sites(sites), service, params)
    }

    pub fn filter(&self) -> &MajorFilter {
        &self.filter
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }
}

// ---------------------------------------------------------------------------
// Time series records (JSON path)
// ---------------------------------------------------------------------------

/// Site coordinates from `sourceInfo.geoLocation.geogLocation`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoLocation {
    pub srs: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// One entry of `values[0].value[]`.
///
/// The service encodes every value as a JSON string; the source text is kept
/// as-is and converted on request.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date_time: String, // ISO 8601, e.g. "2024-05-01T12:00:00.000-05:00"
    pub value: String,
    pub qualifiers: Vec<String>,
}

impl Observation {
    pub fn numeric_value(&self) -> Result<f64> {
        self.value.trim().parse::<f64>().map_err(|e| {
            NwisError::MalformedResponse(format!(
                "value '{}' at {} is not numeric: {}",
                self.value, self.date_time, e
            ))
        })
    }

    pub fn timestamp(&self) -> Result<UsgsTimestamp> {
        parse_usgs_datetime(&self.date_time)
    }
}

/// One `timeSeries` entry, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesRecord {
    pub site_code: String,
    pub site_name: String,
    pub location: GeoLocation,
    pub parameter_code: Option<String>,
    pub unit: String,
    pub description: String,
    /// Default UTC offset of the site, e.g. `"-05:00"`.
    pub zone_offset: String,
    pub no_data_value: Option<f64>,
    /// Qualifier code → description, from the first values block only.
    pub qualifier_codes: BTreeMap<String, String>,
    /// Observations of the first values block, in response order.
    pub observations: Vec<Observation>,
}

// ---------------------------------------------------------------------------
// Site records (RDB path)
// ---------------------------------------------------------------------------

/// One RDB data row, column name → cell text.
pub type SiteRecord = BTreeMap<String, String>;

/// A parsed RDB document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteTable {
    /// All `#` comment lines, each followed by `\n`.
    pub info: String,
    /// Column names from the header row.
    pub columns: Vec<String>,
    pub rows: Vec<SiteRecord>,
}

impl SiteTable {
    /// Values of the `site_no` column in row order.
    pub fn site_ids(&self) -> Result<Vec<String>> {
        self.column("site_no")
    }

    /// All values of one column in row order.
    pub fn column(&self, name: &str) -> Result<Vec<String>> {
        if !self.columns.iter().any(|c| c == name) {
            return Err(NwisError::MalformedResponse(format!(
                "RDB table has no '{}' column",
                name
            )));
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|row| row.get(name).cloned())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Core data
// ---------------------------------------------------------------------------

/// One point of a core series. `value` is `None` when the source text is
/// not numeric or equals the series' no-data sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct CorePoint {
    pub date_time: String,
    pub value: Option<f64>,
    pub qualifiers: Vec<String>,
}

/// The flattened, analysis-ready view of a `TimeSeriesRecord`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreRecord {
    pub site: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub unit: String,
    pub description: String,
    pub time_zone: String,
    pub qualifier_codes: BTreeMap<String, String>,
    pub data: Vec<CorePoint>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
