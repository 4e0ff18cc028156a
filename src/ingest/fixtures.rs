//! Test fixtures: representative payloads from the NWIS water services.
//!
//! The JSON fixtures are structurally complete but truncated to the minimum
//! needed to exercise the parser. They follow the WaterML-as-JSON envelope
//! returned by `https://waterservices.usgs.gov/nwis/{dv,iv}/?format=json&...`
//!
//! Response shape:
//!   value.timeSeries[]
//!     .sourceInfo.siteName
//!     .sourceInfo.siteCode[0].value              — site number (string)
//!     .sourceInfo.timeZoneInfo.defaultTimeZone.zoneOffset
//!     .sourceInfo.geoLocation.geogLocation       — srs, latitude, longitude
//!     .variable.variableCode[0].value            — parameter code (string)
//!     .variable.variableDescription
//!     .variable.unit.unitCode
//!     .variable.noDataValue                      — sentinel (-999999)
//!     .values[0].value[]                         — value (STRING), qualifiers[], dateTime
//!     .values[0].qualifier[]                     — qualifierCode, qualifierDescription
//!
//! The RDB fixture mirrors `https://waterservices.usgs.gov/nwis/site/?format=rdb&...`

/// Daily discharge at Little Falls: one series, two qualifier codes, three
/// observations.
#[cfg(test)]
pub(crate) fn fixture_minimal_dv_json() -> &'static str {
    r#"{
      "name": "ns1:timeSeriesResponseType",
      "value": {
        "queryInfo": { "queryURL": "http://waterservices.usgs.gov/nwis/dv/format=json&sites=01646500&parameterCd=00060" },
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "POTOMAC RIVER NEAR WASH, DC LITTLE FALLS PUMP STA",
              "siteCode": [{ "value": "01646500", "network": "NWIS", "agencyCode": "USGS" }],
              "timeZoneInfo": {
                "defaultTimeZone": { "zoneOffset": "-05:00", "zoneAbbreviation": "EST" },
                "daylightSavingsTimeZone": { "zoneOffset": "-04:00", "zoneAbbreviation": "EDT" },
                "siteUsesDaylightSavingsTime": true
              },
              "geoLocation": {
                "geogLocation": { "srs": "EPSG:4326", "latitude": 38.94977778, "longitude": -77.12763889 },
                "localSiteXY": []
              }
            },
            "variable": {
              "variableCode": [{ "value": "00060", "network": "NWIS", "vocabulary": "NWIS:UnitValues" }],
              "variableName": "Streamflow, ft&#179;/s",
              "variableDescription": "Discharge, cubic feet per second",
              "unit": { "unitCode": "ft3/s" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "10300", "qualifiers": ["A"], "dateTime": "2024-05-01T00:00:00.000" },
                { "value": "9870", "qualifiers": ["A"], "dateTime": "2024-05-02T00:00:00.000" },
                { "value": "9410", "qualifiers": ["A", "e"], "dateTime": "2024-05-03T00:00:00.000" }
              ],
              "qualifier": [
                { "qualifierCode": "A", "qualifierDescription": "Approved for publication -- Processing and review completed.", "qualifierID": 0, "network": "NWIS", "vocabulary": "uv_rmk_cd" },
                { "qualifierCode": "e", "qualifierDescription": "Value has been estimated.", "qualifierID": 1, "network": "NWIS", "vocabulary": "uv_rmk_cd" }
              ],
              "method": [{ "methodID": 69928 }]
            }]
          }
        ]
      }
    }"#
}

/// Two sites in one instantaneous values response: Peoria pool gauge (stage,
/// no qualifier descriptions) and Chillicothe (discharge, including a
/// sentinel reading).
#[cfg(test)]
pub(crate) fn fixture_multi_site_iv_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "Illinois River at Peoria, IL",
              "siteCode": [{ "value": "05567500", "network": "NWIS", "agencyCode": "USGS" }],
              "timeZoneInfo": { "defaultTimeZone": { "zoneOffset": "-06:00", "zoneAbbreviation": "CST" } },
              "geoLocation": { "geogLocation": { "srs": "EPSG:4326", "latitude": 40.6939, "longitude": -89.5898 } }
            },
            "variable": {
              "variableCode": [{ "value": "00065", "network": "NWIS" }],
              "variableDescription": "Gage height, feet",
              "unit": { "unitCode": "ft" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "14.85", "qualifiers": ["P"], "dateTime": "2024-05-01T12:00:00.000-05:00" }
              ],
              "qualifier": []
            }]
          },
          {
            "sourceInfo": {
              "siteName": "Illinois River at Chillicothe, IL",
              "siteCode": [{ "value": "05568000", "network": "NWIS", "agencyCode": "USGS" }],
              "timeZoneInfo": { "defaultTimeZone": { "zoneOffset": "-06:00", "zoneAbbreviation": "CST" } },
              "geoLocation": { "geogLocation": { "srs": "EPSG:4326", "latitude": 40.92, "longitude": -89.4854 } }
            },
            "variable": {
              "variableCode": [{ "value": "00060", "network": "NWIS" }],
              "variableDescription": "Discharge, cubic feet per second",
              "unit": { "unitCode": "ft3/s" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "39100", "qualifiers": ["P"], "dateTime": "2024-05-01T12:00:00.000-05:00" },
                { "value": "-999999", "qualifiers": ["P", "Eqp"], "dateTime": "2024-05-01T12:15:00.000-05:00" }
              ],
              "qualifier": [
                { "qualifierCode": "P", "qualifierDescription": "Provisional data subject to revision." },
                { "qualifierCode": "Eqp", "qualifierDescription": "Equipment malfunction." }
              ]
            }]
          }
        ]
      }
    }"#
}

/// Kingston Mines stage split into two values blocks (two methods). Only the
/// first block is meant to be read.
#[cfg(test)]
pub(crate) fn fixture_two_values_blocks_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "Illinois River at Kingston Mines, IL",
              "siteCode": [{ "value": "05568500", "network": "NWIS", "agencyCode": "USGS" }],
              "timeZoneInfo": { "defaultTimeZone": { "zoneOffset": "-06:00", "zoneAbbreviation": "CST" } },
              "geoLocation": { "geogLocation": { "srs": "EPSG:4326", "latitude": 40.5614, "longitude": -89.9956 } }
            },
            "variable": {
              "variableCode": [{ "value": "00065", "network": "NWIS" }],
              "variableDescription": "Gage height, feet",
              "unit": { "unitCode": "ft" },
              "noDataValue": -999999.0
            },
            "values": [
              {
                "value": [
                  { "value": "18.42", "qualifiers": ["P"], "dateTime": "2024-05-01T12:00:00.000-05:00" }
                ],
                "qualifier": [{ "qualifierCode": "P", "qualifierDescription": "Provisional data subject to revision." }]
              },
              {
                "value": [
                  { "value": "18.40", "qualifiers": ["A"], "dateTime": "2024-05-01T12:00:00.000-05:00" },
                  { "value": "18.44", "qualifiers": ["A"], "dateTime": "2024-05-01T12:15:00.000-05:00" }
                ],
                "qualifier": [{ "qualifierCode": "A", "qualifierDescription": "Approved for publication -- Processing and review completed." }]
              }
            ]
          }
        ]
      }
    }"#
}

/// Site service output for two Maryland sites, with the RDB format
/// descriptor line.
#[cfg(test)]
pub(crate) fn fixture_site_rdb() -> &'static str {
    "#\n\
     # US Geological Survey\n\
     # retrieved: 2024-05-01 10:00:00 -04:00\t(vaas01)\n\
     #\n\
     # The Site File stores location and general information about groundwater,\n\
     # surface water, and meteorological sites\n\
     #\n\
     agency_cd\tsite_no\tstation_nm\tsite_tp_cd\tdec_lat_va\tdec_long_va\n\
     5s\t15s\t50s\t7s\t16s\t16s\n\
     USGS\t01646500\tPOTOMAC RIVER NEAR WASH, DC LITTLE FALLS PUMP STA\tST\t38.94977778\t-77.12763889\n\
     USGS\t01638500\tPOTOMAC RIVER AT POINT OF ROCKS, MD\tST\t39.27394444\t-77.5433056\n"
}
