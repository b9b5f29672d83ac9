//! Turn configured lots into lots with literal coordinates.
//!
//! Failures are isolated per lot: a lot that fails validation or geocoding is
//! logged and left out, siblings still resolve.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};

use crate::geo::Coord;
use crate::geocode::{self, GeocodeError, Geocoder};
use crate::lot::{Endpoint, Lot, LotError, ResolvedLot, Row};

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    Invalid(LotError),
    Geocode(GeocodeError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Invalid(e) => write!(f, "{e}"),
            ResolveError::Geocode(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<LotError> for ResolveError {
    fn from(e: LotError) -> Self {
        ResolveError::Invalid(e)
    }
}

impl From<GeocodeError> for ResolveError {
    fn from(e: GeocodeError) -> Self {
        ResolveError::Geocode(e)
    }
}

/// Outcome of resolving the whole table
pub struct Resolved {
    pub lots: Vec<ResolvedLot>,
    pub failed: Vec<(String, ResolveError)>,
}

pub struct Resolver {
    geocoder: Arc<dyn Geocoder>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, timeout: Duration) -> Self {
        Self { geocoder, timeout }
    }

    fn endpoint(&self, ep: &Endpoint) -> Result<Coord, ResolveError> {
        match ep {
            Endpoint::Coord(c) => {
                c.validate().map_err(LotError::from)?;
                Ok(*c)
            }
            Endpoint::Address(query) => {
                Ok(geocode::with_timeout(self.geocoder.clone(), query, self.timeout)?)
            }
        }
    }

    /// Resolve one lot. Geocodes run one after another, each bounded by the
    /// resolver's timeout.
    pub fn lot(&self, lot: &Lot) -> Result<ResolvedLot, ResolveError> {
        lot.validate()?;

        let anchor = match &lot.anchor {
            Some(ep) => Some(self.endpoint(ep)?),
            None => None,
        };

        let mut rows = Vec::with_capacity(lot.rows.len());
        for row in &lot.rows {
            rows.push(Row {
                start: self.endpoint(&row.start)?,
                end: self.endpoint(&row.end)?,
                count: row.count,
                available: row.available,
            });
        }

        Ok(Lot {
            name: lot.name.clone(),
            bounds: lot.bounds,
            anchor,
            rows,
        })
    }

    pub fn all(&self, lots: &[Lot]) -> Resolved {
        let mut out = Resolved {
            lots: Vec::with_capacity(lots.len()),
            failed: Vec::new(),
        };
        for lot in lots {
            match self.lot(lot) {
                Ok(resolved) => {
                    info!(
                        "Lot {} ready ({}/{} available)",
                        lot.name,
                        resolved.available(),
                        resolved.total()
                    );
                    out.lots.push(resolved);
                }
                Err(e) => {
                    error!("Error creating {}: {}", lot.name, e);
                    out.failed.push((lot.name.clone(), e));
                }
            }
        }
        out
    }
}
