//! FILENAME: tests/common/mod.rs
//! Shared fixtures for catalogue integration tests.

use catalogue::Listing;
use serde_json::{json, Value};

pub struct ListingFixture;

impl ListingFixture {
    /// Three tables: variables `[Year, Sex]`, `[Year, County]`, `[Month]`.
    pub fn collection() -> Value {
        json!({
            "class": "collection",
            "link": {"item": [
                {
                    "class": "dataset",
                    "label": "Population by Year and County",
                    "updated": "2023-06-01T10:00:00Z",
                    "extension": {
                        "matrix": "FY003A",
                        "exceptional": true,
                        "copyright": {"name": "Central Statistics Office, Ireland"}
                    },
                    "role": {"time": ["TLIST(A1)"]},
                    "dimension": {
                        "STATISTIC": {"label": "Statistic"},
                        "TLIST(A1)": {"label": "Year", "category": {"index": ["2011", "2016", "2022"]}},
                        "C02196V02652": {"label": "County"}
                    }
                },
                {
                    "class": "dataset",
                    "label": "Births by Year and Sex",
                    "updated": "2024-01-10T09:30:00Z",
                    "extension": {
                        "matrix": "VSA01",
                        "copyright": {"name": "Central Statistics Office, Ireland"}
                    },
                    "role": {"time": ["TLIST(A1)"]},
                    "dimension": {
                        "STATISTIC": {"label": "Statistic"},
                        "TLIST(A1)": {"label": "Year", "category": {"index": ["2000", "2010", "2020"]}},
                        "C02199V02655": {"label": "Sex"}
                    }
                },
                {
                    "class": "dataset",
                    "label": "Monthly Unemployment",
                    "updated": "2024-04-02T11:00:00Z",
                    "extension": {
                        "matrix": "MUM01",
                        "copyright": {"name": "Department of Social Protection"}
                    },
                    "role": {"time": ["TLIST(M1)"]},
                    "dimension": {
                        "TLIST(M1)": {
                            "label": "Month",
                            "category": {
                                "index": ["1998M01", "2024M03"],
                                "label": {"1998M01": "1998 January", "2024M03": "2024 March"}
                            }
                        }
                    }
                }
            ]}
        })
    }

    pub fn listing() -> Listing {
        Listing::from_collection(&Self::collection()).unwrap()
    }
}

pub fn codes(listing: &Listing) -> Vec<&str> {
    listing.iter().map(|e| e.code.as_str()).collect()
}
