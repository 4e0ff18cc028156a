//! Query objects: a query descriptor bound to a transport, with the raw
//! response memoized.
//!
//! Each query object fetches its URL at most once. Later calls reuse the
//! cached text until [`ResponseCache::invalidate`] (exposed as
//! `invalidate()` on the query objects) clears it. Parsed records are not
//! cached; they are recomputed from the cached text on every call.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use nwis_client::client::TimeSeriesQuery;
//! use nwis_client::config::ClientConfig;
//! use nwis_client::model::Service;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let config = ClientConfig::from_env()?;
//! let mut dv = TimeSeriesQuery::by_sites(["01646500"], Service::DailyValues, start, end, None, &config)?;
//! for series in dv.core_data()? {
//!     println!("{} {}: {} points", series.site, series.name, series.data.len());
//! }
//! # Ok::<(), nwis_client::model::NwisError>(())
//! ```

use chrono::NaiveDateTime;
use log::debug;

use crate::analysis::core_data::extract_core;
use crate::config::ClientConfig;
use crate::ingest::{rdb::parse_rdb, timeseries::parse_time_series};
use crate::model::{
    CoreRecord, MajorFilter, NwisError, Query, QueryParams, Result, Service, SiteTable, TimeSeriesRecord,
};
use crate::query::render_query;
use crate::transport::{fetch_text, HttpTransport, Transport};

// ---------------------------------------------------------------------------
// Response cache
// ---------------------------------------------------------------------------

/// Holds the raw response text of one query object.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    raw: Option<String>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn is_cached(&self) -> bool {
        self.raw.is_some()
    }

    /// Returns the cached text, running `fetch` only when nothing is cached.
    /// A failed fetch leaves the cache empty.
    pub fn get_or_fetch(&mut self, fetch: impl FnOnce() -> Result<String>) -> Result<&str> {
        if self.raw.is_some() {
            debug!("Reusing cached response");
        } else {
            self.raw = Some(fetch()?);
        }
        Ok(self.raw.as_deref().unwrap_or_default())
    }

    /// Drops the cached text so the next access fetches again.
    pub fn invalidate(&mut self) {
        if self.raw.take().is_some() {
            debug!("Cached response invalidated");
        }
    }
}

// ---------------------------------------------------------------------------
// Time series queries (dv / iv)
// ---------------------------------------------------------------------------

/// Daily or instantaneous values for one query descriptor.
#[derive(Debug)]
pub struct TimeSeriesQuery<T: Transport = HttpTransport> {
    query: Query,
    base_url: String,
    transport: T,
    cache: ResponseCache,
}

impl TimeSeriesQuery<HttpTransport> {
    /// Binds `query` to an HTTP transport built from `config`.
    pub fn from_config(query: Query, config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(query, transport, config)
    }

    /// Values for a list of sites over a date range; see [`Query::by_sites`].
    pub fn by_sites<I, S>(
        sites: I,
        service: Service,
        start: NaiveDateTime,
        end: NaiveDateTime,
        parameter_cd: Option<&str>,
        config: &ClientConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let query = Query::by_sites(sites, service, start, end, parameter_cd)?;
        Self::from_config(query, config)
    }
}

impl<T: Transport> TimeSeriesQuery<T> {
    /// # Errors
    /// `NwisError::Configuration` if `query` targets the site service.
    pub fn with_transport(query: Query, transport: T, config: &ClientConfig) -> Result<Self> {
        if query.service() == Service::Sites {
            return Err(NwisError::Configuration(
                "the site service does not serve time series; use SitesQuery".to_string(),
            ));
        }
        config.validate()?;

        Ok(Self {
            query,
            base_url: config.base_url.clone(),
            transport,
            cache: ResponseCache::new(),
        })
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn request_url(&self) -> Result<String> {
        render_query(&self.base_url, &self.query)
    }

    /// The response text, fetched on first use.
    pub fn raw_data(&mut self) -> Result<&str> {
        let url = self.request_url()?;
        let transport = &self.transport;
        self.cache.get_or_fetch(|| fetch_text(transport, &url))
    }

    /// Parsed time series, recomputed from the cached response.
    pub fn get_data(&mut self) -> Result<Vec<TimeSeriesRecord>> {
        let raw = self.raw_data()?;
        parse_time_series(raw)
    }

    /// Flattened core records, recomputed from the cached response.
    pub fn core_data(&mut self) -> Result<Vec<CoreRecord>> {
        Ok(extract_core(&self.get_data()?))
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_cached()
    }

    /// Forgets the cached response; the next call fetches again.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}

// ---------------------------------------------------------------------------
// Site queries
// ---------------------------------------------------------------------------

/// Site metadata from the site service, which only offers RDB.
#[derive(Debug)]
pub struct SitesQuery<T: Transport = HttpTransport> {
    query: Query,
    base_url: String,
    transport: T,
    cache: ResponseCache,
}

impl SitesQuery<HttpTransport> {
    pub fn from_config(filter: MajorFilter, params: QueryParams, config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(filter, params, transport, config)
    }
}

impl<T: Transport> SitesQuery<T> {
    pub fn with_transport(
        filter: MajorFilter,
        params: QueryParams,
        transport: T,
        config: &ClientConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            query: Query::new(filter, Service::Sites, params)?,
            base_url: config.base_url.clone(),
            transport,
            cache: ResponseCache::new(),
        })
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn request_url(&self) -> Result<String> {
        render_query(&self.base_url, &self.query)
    }

    pub fn raw_data(&mut self) -> Result<&str> {
        let url = self.request_url()?;
        let transport = &self.transport;
        self.cache.get_or_fetch(|| fetch_text(transport, &url))
    }

    /// Parsed RDB table, recomputed from the cached response.
    pub fn get_data(&mut self) -> Result<SiteTable> {
        let raw = self.raw_data()?;
        parse_rdb(raw)
    }

    /// Site numbers (`site_no`) of every row, in row order. Fetches on
    /// first use.
    pub fn site_ids(&mut self) -> Result<Vec<String>> {
        self.get_data()?.site_ids()
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_cached()
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use crate::model::{ParamValue, ResponseFormat};
    use crate::transport::RawResponse;
    use std::cell::{Cell, RefCell};

    /// Serves a fixed body and counts requests.
    struct CountingTransport {
        body: RefCell<String>,
        calls: Cell<usize>,
        last_url: RefCell<Option<String>>,
    }

    impl CountingTransport {
        fn serving(body: &str) -> Self {
            Self {
                body: RefCell::new(body.to_string()),
                calls: Cell::new(0),
                last_url: RefCell::new(None),
            }
        }
    }

    impl Transport for CountingTransport {
        fn get(&self, url: &str) -> Result<RawResponse> {
            self.calls.set(self.calls.get() + 1);
            *self.last_url.borrow_mut() = Some(url.to_string());
            Ok(RawResponse::ok(self.body.borrow().clone()))
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn get(&self, _url: &str) -> Result<RawResponse> {
            Err(NwisError::Transport(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))))
        }
    }

    fn dv_query() -> Query {
        Query::new(
            MajorFilter::sites(["01646500"]),
            Service::DailyValues,
            QueryParams::new().with("parameterCd", "00060"),
        )
        .expect("valid query")
    }

    // --- ResponseCache ----------------------------------------------------------

    #[test]
    fn test_cache_runs_fetch_once() {
        let mut cache = ResponseCache::new();
        let calls = Cell::new(0);
        let fetch = || -> Result<String> {
            calls.set(calls.get() + 1);
            Ok("body".to_string())
        };

        assert_eq!(cache.get_or_fetch(fetch).expect("first"), "body");
        assert_eq!(cache.get_or_fetch(fetch).expect("second"), "body");
        assert_eq!(calls.get(), 1);

        cache.invalidate();
        assert!(!cache.is_cached());
        cache.get_or_fetch(fetch).expect("third");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failed_fetch_leaves_cache_empty() {
        let mut cache = ResponseCache::new();
        let result = cache.get_or_fetch(|| Err(NwisError::MalformedResponse("boom".into())));
        assert!(result.is_err());
        assert!(cache.get().is_none());
    }

    // --- TimeSeriesQuery --------------------------------------------------------

    #[test]
    fn test_get_data_twice_fetches_once() {
        let transport = CountingTransport::serving(fixture_minimal_dv_json());
        let mut dv = TimeSeriesQuery::with_transport(dv_query(), &transport, &ClientConfig::default())
            .expect("valid");

        let first = dv.get_data().expect("first call");
        let second = dv.get_data().expect("second call");

        assert_eq!(transport.calls.get(), 1, "second call must reuse the cached response");
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let transport = CountingTransport::serving(fixture_minimal_dv_json());
        let mut dv = TimeSeriesQuery::with_transport(dv_query(), &transport, &ClientConfig::default())
            .expect("valid");

        dv.get_data().expect("first call");
        dv.invalidate();
        assert!(!dv.is_cached());

        *transport.body.borrow_mut() = fixture_multi_site_iv_json().to_string();
        let refreshed = dv.core_data().expect("after invalidate");

        assert_eq!(transport.calls.get(), 2);
        assert_eq!(refreshed.len(), 2, "core data must come from the new response");
    }

    #[test]
    fn test_request_url_uses_configured_base() {
        let transport = CountingTransport::serving(fixture_minimal_dv_json());
        let config = ClientConfig {
            base_url: "http://localhost:8080".to_string(),
            ..ClientConfig::default()
        };
        let mut dv = TimeSeriesQuery::with_transport(dv_query(), &transport, &config).expect("valid");
        dv.raw_data().expect("fetch");

        assert_eq!(
            transport.last_url.borrow().as_deref(),
            Some("http://localhost:8080/nwis/dv/?parameterCd=00060&sites=01646500&format=json")
        );
    }

    #[test]
    fn test_core_data_matches_extract_core() {
        let transport = CountingTransport::serving(fixture_minimal_dv_json());
        let mut dv = TimeSeriesQuery::with_transport(dv_query(), &transport, &ClientConfig::default())
            .expect("valid");

        let core = dv.core_data().expect("core");
        let records = dv.get_data().expect("records");
        assert_eq!(core, extract_core(&records));
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn test_site_service_query_is_rejected() {
        let query = Query::new(MajorFilter::StateCode("md".into()), Service::Sites, QueryParams::new())
            .expect("valid descriptor");
        let result = TimeSeriesQuery::with_transport(query, FailingTransport, &ClientConfig::default());
        assert!(matches!(result, Err(NwisError::Configuration(_))));
    }

    #[test]
    fn test_transport_error_propagates_and_nothing_is_cached() {
        let mut dv = TimeSeriesQuery::with_transport(dv_query(), FailingTransport, &ClientConfig::default())
            .expect("valid");
        match dv.get_data() {
            Err(NwisError::Transport(err)) => assert!(err.to_string().contains("connection refused")),
            other => panic!("expected Transport error, got {:?}", other),
        }
        assert!(!dv.is_cached());
    }

    #[test]
    fn test_malformed_cached_response_errors_on_every_parse() {
        let transport = CountingTransport::serving(r#"{"value": {}}"#);
        let mut dv = TimeSeriesQuery::with_transport(dv_query(), &transport, &ClientConfig::default())
            .expect("valid");

        assert!(matches!(dv.get_data(), Err(NwisError::MalformedResponse(_))));
        assert!(matches!(dv.get_data(), Err(NwisError::MalformedResponse(_))));
        assert_eq!(transport.calls.get(), 1);
    }

    // --- SitesQuery -------------------------------------------------------------

    #[test]
    fn test_sites_query_forces_rdb_format() {
        let extra = QueryParams::new().with("format", "json").with("siteType", "ST");
        let sites = SitesQuery::with_transport(
            MajorFilter::StateCode("md".into()),
            extra,
            FailingTransport,
            &ClientConfig::default(),
        )
        .expect("valid");

        assert_eq!(sites.query().format(), ResponseFormat::Rdb);
        let url = sites.request_url().expect("url");
        assert_eq!(url, "https://waterservices.usgs.gov/nwis/site/?format=rdb&siteType=ST&stateCd=md");
    }

    #[test]
    fn test_site_ids_fetches_lazily_once() {
        let transport = CountingTransport::serving(fixture_site_rdb());
        let mut sites = SitesQuery::with_transport(
            MajorFilter::CountyCodes(vec!["24031".into()]),
            QueryParams::new(),
            &transport,
            &ClientConfig::default(),
        )
        .expect("valid");

        assert_eq!(transport.calls.get(), 0, "construction must not fetch");
        assert_eq!(sites.site_ids().expect("ids"), vec!["01646500", "01638500"]);
        assert_eq!(sites.get_data().expect("table").rows.len(), 2);
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn test_sites_query_rejects_invalid_filter_before_network() {
        let transport = CountingTransport::serving(fixture_site_rdb());
        let result = SitesQuery::with_transport(
            MajorFilter::HucCodes(vec![]),
            QueryParams::new(),
            &transport,
            &ClientConfig::default(),
        );
        assert!(matches!(result, Err(NwisError::Configuration(_))));
        assert_eq!(transport.calls.get(), 0);

        let from_pairs = MajorFilter::from_pairs([("stateCd", ParamValue::from("md")), ("huc", ParamValue::from("02070008"))]);
        assert!(matches!(from_pairs, Err(NwisError::Configuration(_))));
    }
}
