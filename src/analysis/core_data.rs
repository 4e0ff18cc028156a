//! Core data extraction.
//!
//! `extract_core` reduces parsed `TimeSeriesRecord`s to the fields needed
//! for plotting and analysis: site identity, coordinates, unit, description,
//! time zone, qualifier descriptions, and the observations with numeric
//! values. One record in gives one record out, in the same order.

use crate::model::{CorePoint, CoreRecord, Observation, TimeSeriesRecord};

/// Sentinel comparison tolerance; the service writes `-999999` as text and
/// `-999999.0` in `noDataValue`.
const SENTINEL_TOLERANCE: f64 = 0.1;

/// Flattens each record into a `CoreRecord`.
///
/// Pure: the same input always gives the same output, and nothing is
/// cached between calls. A value that is not numeric, or equals the series'
/// no-data sentinel, becomes `None` so the timestamps line up with the
/// source.
pub fn extract_core(records: &[TimeSeriesRecord]) -> Vec<CoreRecord> {
    records.iter().map(core_record).collect()
}

fn core_record(record: &TimeSeriesRecord) -> CoreRecord {
    CoreRecord {
        site: record.site_code.clone(),
        name: record.site_name.clone(),
        latitude: record.location.latitude,
        longitude: record.location.longitude,
        unit: record.unit.clone(),
        description: record.description.clone(),
        time_zone: record.zone_offset.clone(),
        qualifier_codes: record.qualifier_codes.clone(),
        data: record
            .observations
            .iter()
            .map(|obs| core_point(obs, record.no_data_value))
            .collect(),
    }
}

fn core_point(obs: &Observation, no_data_value: Option<f64>) -> CorePoint {
    let value = obs.numeric_value().ok().filter(|v| {
        no_data_value.is_none_or(|sentinel| (v - sentinel).abs() >= SENTINEL_TOLERANCE)
    });

    CorePoint {
        date_time: obs.date_time.clone(),
        value,
        qualifiers: obs.qualifiers.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
