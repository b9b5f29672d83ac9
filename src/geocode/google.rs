//! Google Geocoding API client.
//!
//! GET https://maps.googleapis.com/maps/api/geocode/json?address=..&key=..
//!   -> status "OK": results[0].geometry.location {lat, lng}
//!   -> status "ZERO_RESULTS": not found
//!   -> anything else: provider error carrying the status

use std::time::Duration;

use super::{GeocodeError, Geocoder};
use crate::geo::Coord;

const ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const USER_AGENT: &str = "parkmap/0.3 (parking occupancy map)";

pub struct GoogleGeocoder {
    agent: ureq::Agent,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_key: api_key.to_string(),
        }
    }

    fn http_get(&self, query: &str) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let resp = self
            .agent
            .get(ENDPOINT)
            .query("address", query)
            .query("key", &self.api_key)
            .call()?;
        Ok(resp.into_json()?)
    }
}

impl Geocoder for GoogleGeocoder {
    fn geocode(&self, query: &str) -> Result<Coord, GeocodeError> {
        log::debug!("Geocoding {query} via Google");
        let body = self.http_get(query).map_err(|e| GeocodeError::Transport {
            query: query.to_string(),
            message: e.to_string(),
        })?;
        parse_response(query, &body)
    }
}

/// Map a Geocoding API response body onto a coordinate or error kind
pub fn parse_response(query: &str, body: &serde_json::Value) -> Result<Coord, GeocodeError> {
    let status = body["status"].as_str().unwrap_or("MISSING_STATUS");
    match status {
        "OK" => {}
        "ZERO_RESULTS" => {
            return Err(GeocodeError::NotFound {
                query: query.to_string(),
            })
        }
        other => {
            return Err(GeocodeError::Provider {
                query: query.to_string(),
                status: other.to_string(),
            })
        }
    }

    let location = &body["results"][0]["geometry"]["location"];
    let lat = location["lat"].as_f64();
    let lng = location["lng"].as_f64();

    match (lat, lng) {
        (Some(lat), Some(lng)) => Coord::new(lat, lng).map_err(|e| GeocodeError::Provider {
            query: query.to_string(),
            status: e.to_string(),
        }),
        _ => Err(GeocodeError::Provider {
            query: query.to_string(),
            status: "OK without location".to_string(),
        }),
    }
}
