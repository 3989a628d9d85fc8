//! FILENAME: tests/common/mod.rs
//! Stub transport and payload fixtures for dataset integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use dataset::{DatasetError, PayloadSource};
use serde_json::{json, Value};

pub const BOUNDARY_URL: &str = "https://example.org/boundaries/counties.geojson";

/// Serves fixed payloads and counts how often each kind is fetched.
#[derive(Default)]
pub struct StubSource {
    pub dataset_fetches: AtomicUsize,
    pub boundary_fetches: AtomicUsize,
    pub collection_fetches: AtomicUsize,
    /// Drop this county from the boundary file.
    pub missing_boundary: Option<&'static str>,
}

impl StubSource {
    pub fn new() -> Arc<Self> {
        Arc::new(StubSource::default())
    }

    pub fn without_boundary(code: &'static str) -> Arc<Self> {
        Arc::new(StubSource {
            missing_boundary: Some(code),
            ..StubSource::default()
        })
    }

    pub fn dataset_fetches(&self) -> usize {
        self.dataset_fetches.load(Ordering::SeqCst)
    }

    pub fn boundary_fetches(&self) -> usize {
        self.boundary_fetches.load(Ordering::SeqCst)
    }

    pub fn collection_fetches(&self) -> usize {
        self.collection_fetches.load(Ordering::SeqCst)
    }
}

impl PayloadSource for StubSource {
    fn fetch_dataset(&self, table_code: &str) -> dataset::Result<Value> {
        self.dataset_fetches.fetch_add(1, Ordering::SeqCst);
        match table_code {
            "FY003A" => Ok(census_payload()),
            other => Err(DatasetError::Source(format!("no table {}", other))),
        }
    }

    fn fetch_boundaries(&self, url: &str) -> dataset::Result<Value> {
        self.boundary_fetches.fetch_add(1, Ordering::SeqCst);
        if url != BOUNDARY_URL {
            return Err(DatasetError::Source(format!("no boundaries at {}", url)));
        }
        let features: Vec<Value> = ["01", "02", "03", "04"]
            .iter()
            .filter(|code| Some(**code) != self.missing_boundary)
            .map(|code| {
                json!({
                    "type": "Feature",
                    "properties": {"code": code},
                    "geometry": {"type": "Point", "coordinates": [-8.0, 53.0]}
                })
            })
            .collect();
        Ok(json!({
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "EPSG:2157"}},
            "features": features
        }))
    }

    fn fetch_collection(&self, _from: Option<NaiveDate>) -> dataset::Result<Value> {
        self.collection_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(collection_payload())
    }
}

/// Statistic(2) x Census Year(2) x Sex(2) x County(5), linked to boundaries.
pub fn census_payload() -> Value {
    let values: Vec<Value> = (0..40)
        .map(|v| if v % 9 == 4 { json!("..") } else { json!(v) })
        .collect();
    json!({
        "class": "dataset",
        "label": "Population by Sex and County & City",
        "updated": "2024-01-15T11:00:00Z",
        "id": ["STATISTIC", "TLIST(A1)", "C02199V02655", "C02196V02652"],
        "size": [2, 2, 2, 5],
        "role": {"time": ["TLIST(A1)"], "metric": ["STATISTIC"], "geo": ["C02196V02652"]},
        "dimension": {
            "STATISTIC": {
                "label": "STATISTIC",
                "category": {
                    "index": ["POP", "PCT"],
                    "label": {"POP": "Population", "PCT": "Percentage of State"},
                    "unit": {
                        "POP": {"label": "Number", "decimals": 0},
                        "PCT": {"label": "%", "decimals": 1}
                    }
                }
            },
            "TLIST(A1)": {
                "label": "Census Year",
                "category": {"index": ["2016", "2022"]}
            },
            "C02199V02655": {
                "label": "Sex",
                "category": {"index": ["1", "2"], "label": {"1": "Male", "2": "Female"}}
            },
            "C02196V02652": {
                "label": "Counties & Cities",
                "category": {
                    "index": ["IE0", "01", "02", "03", "04"],
                    "label": {"IE0": "State", "01": "Carlow", "02": "Dublin", "03": "Cork", "04": "Kerry"}
                },
                "link": {"enclosure": [{"href": BOUNDARY_URL}]}
            }
        },
        "value": values,
        "extension": {"matrix": "FY003A", "copyright": {"name": "Central Statistics Office, Ireland"}}
    })
}

pub fn collection_payload() -> Value {
    json!({
        "class": "collection",
        "link": {"item": [
            {
                "label": "Population by Sex and County & City",
                "updated": "2024-01-15T11:00:00Z",
                "extension": {"matrix": "FY003A"},
                "role": {"time": ["TLIST(A1)"]},
                "dimension": {
                    "STATISTIC": {"label": "Statistic"},
                    "TLIST(A1)": {"label": "CensusYear", "category": {"index": ["2016", "2022"]}},
                    "C02199V02655": {"label": "Sex"},
                    "C02196V02652": {"label": "Counties & Cities"}
                }
            },
            {
                "label": "Births Registered",
                "updated": "2024-03-01T09:00:00Z",
                "extension": {"matrix": "VSA01"},
                "role": {"time": ["TLIST(A1)"]},
                "dimension": {
                    "TLIST(A1)": {"label": "Year", "category": {"index": ["2000", "2023"]}},
                    "C02199V02655": {"label": "Sex"}
                }
            }
        ]}
    })
}
