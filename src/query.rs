//! NWIS request URL construction.
//!
//! Every request has the shape
//!
//! ```text
//! <base>/nwis/<dv|iv|site>/?<form-encoded parameters>
//! ```
//!
//! Parameters are merged in a fixed order: caller-supplied secondary
//! parameters first, then the major filter, then `format`. Later merges
//! overwrite earlier ones, so a caller can never override the filter or the
//! format. List values become a single comma-joined value.

use log::debug;

use crate::config::DEFAULT_BASE_URL;
use crate::model::{MajorFilter, ParamValue, Query, QueryParams, ResponseFormat, Result, Service};

/// Service documentation worth keeping at hand when composing queries.
pub const REFERENCE_LINKS: [(&str, &str); 4] = [
    (
        "Daily value testing tool",
        "https://waterservices.usgs.gov/rest/DV-Test-Tool.html",
    ),
    (
        "Parameter listing: Physical",
        "https://help.waterdata.usgs.gov/code/parameter_cd_query?group_cd=PHY",
    ),
    (
        "Hydrological Unit Codes (HUC)",
        "https://water.usgs.gov/GIS/huc_name.html",
    ),
    (
        "State and County codes",
        "https://help.waterdata.usgs.gov/code/county_query?fmt=html",
    ),
];

/// Builds the request URL against the production host.
///
/// # Example
/// ```
/// use nwis_client::model::{MajorFilter, QueryParams, ResponseFormat, Service, PARAM_DISCHARGE};
/// use nwis_client::query::render;
///
/// let url = render(
///     &MajorFilter::sites(["01646500", "01638500"]),
///     Service::DailyValues,
///     ResponseFormat::Json,
///     &QueryParams::new().with("parameterCd", PARAM_DISCHARGE),
/// )
/// .unwrap();
/// assert_eq!(
///     url,
///     "https://waterservices.usgs.gov/nwis/dv/?parameterCd=00060&sites=01646500%2C01638500&format=json"
/// );
/// ```
///
/// # Errors
/// `NwisError::Configuration` if the filter fails validation.
pub fn render(
    filter: &MajorFilter,
    service: Service,
    format: ResponseFormat,
    extra_params: &QueryParams,
) -> Result<String> {
    render_with_base(DEFAULT_BASE_URL, filter, service, format, extra_params)
}

/// Same as [`render`] against an arbitrary host (mirrors, test servers).
pub fn render_with_base(
    base_url: &str,
    filter: &MajorFilter,
    service: Service,
    format: ResponseFormat,
    extra_params: &QueryParams,
) -> Result<String> {
    filter.validate()?;

    let mut merged = extra_params.clone();
    merged.insert(filter.key(), filter.value());
    merged.insert("format", format.as_param());

    let url = format!("{}?{}", service_url(base_url, service), form_encode(&merged));
    debug!("Built request URL: {}", url);
    Ok(url)
}

/// Renders a query descriptor.
pub fn render_query(base_url: &str, query: &Query) -> Result<String> {
    render_with_base(base_url, query.filter(), query.service(), query.format(), query.params())
}

/// `<base>/nwis/<segment>/`
pub fn service_url(base_url: &str, service: Service) -> String {
    format!("{}/nwis/{}/", base_url.trim_end_matches('/'), service.segment())
}

/// `application/x-www-form-urlencoded` serialization of the parameters.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) pass through, spaces become
/// `+`, everything else is percent-escaped, including the commas of joined
/// lists.
pub fn form_encode(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", form_escape(key), form_escape(&value.render())))
        .collect::<Vec<_>>()
        .join("&")
}

fn form_escape(text: &str) -> String {
    urlencoding::encode(text).replace("%20", "+")
}

/// Inverse of [`form_encode`], used to read back a rendered query string.
///
/// Values are returned as scalars; a list renders to the same text as its
/// comma-joined scalar.
pub fn parse_query_string(query: &str) -> Result<QueryParams> {
    let mut params = QueryParams::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(form_unescape(key)?, ParamValue::Scalar(form_unescape(value)?));
    }
    Ok(params)
}

fn form_unescape(text: &str) -> Result<String> {
    let spaced = text.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            crate::model::NwisError::Configuration(format!("query string is not UTF-8: {}", e))
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
