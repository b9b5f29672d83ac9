//! Address-like code -> coordinate.
//!
//! Providers:
//!   1. Static (literal "lat,lng" and the alias table in lots.json)
//!   2. Google Geocoding API (feature "google")
//!
//! Calls are independent: no retry, no caching. `with_timeout` bounds a call
//! that may hang on the network.

#[cfg(feature = "google")]
pub mod google;

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::geo::Coord;

/// Geocoding failure. Every variant carries the original query.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeError {
    NotFound { query: String },
    Provider { query: String, status: String },
    Timeout { query: String, after: Duration },
    Transport { query: String, message: String },
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodeError::NotFound { query } => write!(f, "Geocode found nothing for {query}"),
            GeocodeError::Provider { query, status } => {
                write!(f, "Geocode failed for {query}: {status}")
            }
            GeocodeError::Timeout { query, after } => {
                write!(f, "Geocode for {query} timed out after {}s", after.as_secs_f64())
            }
            GeocodeError::Transport { query, message } => {
                write!(f, "Geocode request for {query} failed: {message}")
            }
        }
    }
}

impl std::error::Error for GeocodeError {}

pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str) -> Result<Coord, GeocodeError>;
}

/// Local lookup: literal coordinates, then exact alias match
#[derive(Default)]
pub struct StaticGeocoder {
    aliases: HashMap<String, Coord>,
}

impl StaticGeocoder {
    pub fn new(aliases: HashMap<String, Coord>) -> Self {
        Self { aliases }
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, query: &str) -> Result<Coord, GeocodeError> {
        if let Some(c) = Coord::parse(query) {
            return Ok(c);
        }
        self.aliases
            .get(query.trim())
            .copied()
            .ok_or_else(|| GeocodeError::NotFound {
                query: query.to_string(),
            })
    }
}

/// Static lookup first; anything it can't answer goes to `remote`
pub struct ChainGeocoder {
    local: StaticGeocoder,
    remote: Option<Box<dyn Geocoder>>,
}

impl ChainGeocoder {
    pub fn new(local: StaticGeocoder, remote: Option<Box<dyn Geocoder>>) -> Self {
        Self { local, remote }
    }
}

impl Geocoder for ChainGeocoder {
    fn geocode(&self, query: &str) -> Result<Coord, GeocodeError> {
        match (self.local.geocode(query), &self.remote) {
            (Err(GeocodeError::NotFound { .. }), Some(remote)) => remote.geocode(query),
            (result, _) => result,
        }
    }
}

/// Run one geocode on a worker thread and wait at most `timeout`.
///
/// A call that outlives the timeout is abandoned; its result is dropped when
/// the worker finishes.
pub fn with_timeout(
    geocoder: Arc<dyn Geocoder>,
    query: &str,
    timeout: Duration,
) -> Result<Coord, GeocodeError> {
    let (tx, rx) = mpsc::channel();
    let owned = query.to_string();
    let spawned = thread::Builder::new()
        .name("geocode".to_string())
        .spawn(move || {
            let _ = tx.send(geocoder.geocode(&owned));
        });

    if let Err(e) = spawned {
        return Err(GeocodeError::Transport {
            query: query.to_string(),
            message: e.to_string(),
        });
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(GeocodeError::Timeout {
            query: query.to_string(),
            after: timeout,
        }),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(GeocodeError::Transport {
            query: query.to_string(),
            message: "geocode worker exited".to_string(),
        }),
    }
}
