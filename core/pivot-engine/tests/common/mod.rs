//! FILENAME: tests/common/mod.rs
//! Fixtures for pivot-engine integration tests.

#![allow(dead_code)]

use cube::Cube;
use serde_json::{json, Value};

/// Builds JSON-stat payloads with a chosen shape.
pub struct CubeFixture;

impl CubeFixture {
    /// Statistic(2) x Year(3) x Sex(2) x County(5). Values count up from 0;
    /// every seventh value is the ".." missing marker.
    pub fn census_payload() -> Value {
        let values: Vec<Value> = (0..60)
            .map(|v| if v % 7 == 3 { json!("..") } else { json!(v) })
            .collect();
        json!({
            "class": "dataset",
            "label": "Population by Sex and County",
            "updated": "2024-01-15T11:00:00Z",
            "id": ["STATISTIC", "TLIST(A1)", "C02199V02655", "C02196V02652"],
            "size": [2, 3, 2, 5],
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
                    "category": {"index": ["2011", "2016", "2022"]}
                },
                "C02199V02655": {
                    "label": "Sex",
                    "category": {"index": ["1", "2"], "label": {"1": "Male", "2": "Female"}}
                },
                "C02196V02652": {
                    "label": "County",
                    "category": {
                        "index": ["IE0", "01", "02", "03", "04"],
                        "label": {"IE0": "State", "01": "Carlow", "02": "Dublin", "03": "Cork", "04": "Kerry"}
                    }
                }
            },
            "value": values,
            "extension": {"matrix": "FY003A"}
        })
    }

    pub fn census() -> Cube {
        cube::parse(&Self::census_payload()).expect("fixture payload parses")
    }

    /// A cube with neither a time nor a statistic role.
    pub fn roleless() -> Cube {
        cube::parse(&json!({
            "id": ["A", "B"],
            "size": [2, 2],
            "dimension": {
                "A": {"label": "Alpha", "category": {"index": ["a1", "a2"]}},
                "B": {"label": "Beta", "category": {"index": ["b1", "b2"]}}
            },
            "value": [1, 2, 3, null]
        }))
        .expect("fixture payload parses")
    }
}
