//! Parking lot table: lots, rows, and their validation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::{Bounds, Coord, InvalidCoordinate};

/// Row endpoint or lot anchor: a literal coordinate or something to geocode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Coord(Coord),
    Address(String),
}

/// Linear run of spots between two endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row<P = Endpoint> {
    pub start: P,
    pub end: P,
    pub count: u32,
    pub available: u32,
}

/// Parking lot as configured. `P` is `Endpoint` until geocoded, then `Coord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot<P = Endpoint> {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<P>,
    pub rows: Vec<Row<P>>,
}

/// Upper bound on spots in one lot; spots are materialized as markers
pub const MAX_SPOTS_PER_LOT: u64 = 10_000;

/// Lot with every endpoint resolved to a coordinate
pub type ResolvedLot = Lot<Coord>;

/// Validation failures for a single lot
#[derive(Debug, Clone, PartialEq)]
pub enum LotError {
    NoRows,
    RowCount { row: usize },
    AvailableExceedsCount { row: usize, available: u32, count: u32 },
    NoPosition,
    TooManySpots { total: u64 },
    InvalidCoordinate(InvalidCoordinate),
}

impl fmt::Display for LotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotError::NoRows => write!(f, "Lot has no rows"),
            LotError::RowCount { row } => write!(f, "Row {} has fewer than 1 spot", row + 1),
            LotError::AvailableExceedsCount { row, available, count } => write!(
                f,
                "Row {}: {} available exceeds {} spots",
                row + 1,
                available,
                count
            ),
            LotError::NoPosition => write!(f, "Lot needs either bounds or an anchor"),
            LotError::TooManySpots { total } => write!(
                f,
                "Lot has {} spots, at most {} supported",
                total, MAX_SPOTS_PER_LOT
            ),
            LotError::InvalidCoordinate(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LotError {}

impl From<InvalidCoordinate> for LotError {
    fn from(e: InvalidCoordinate) -> Self {
        LotError::InvalidCoordinate(e)
    }
}

impl<P> Lot<P> {
    /// Structural checks that hold before and after geocoding
    pub fn validate(&self) -> Result<(), LotError> {
        if self.rows.is_empty() {
            return Err(LotError::NoRows);
        }
        let mut total: u64 = 0;
        for (i, row) in self.rows.iter().enumerate() {
            total += u64::from(row.count);
            if row.count < 1 {
                return Err(LotError::RowCount { row: i });
            }
            if row.available > row.count {
                return Err(LotError::AvailableExceedsCount {
                    row: i,
                    available: row.available,
                    count: row.count,
                });
            }
        }
        if total > MAX_SPOTS_PER_LOT {
            return Err(LotError::TooManySpots { total });
        }
        if self.bounds.is_none() && self.anchor.is_none() {
            return Err(LotError::NoPosition);
        }
        if let Some(b) = &self.bounds {
            b.validate()?;
        }
        Ok(())
    }

    /// Saturates instead of overflowing on tables that were never validated
    pub fn total(&self) -> u32 {
        self.rows.iter().fold(0u32, |acc, r| acc.saturating_add(r.count))
    }

    pub fn available(&self) -> u32 {
        self.rows.iter().fold(0u32, |acc, r| acc.saturating_add(r.available))
    }
}

impl ResolvedLot {
    /// Where the lot-level marker goes: anchor, else bounds center
    pub fn marker_position(&self) -> Option<Coord> {
        self.anchor.or_else(|| self.bounds.map(|b| b.center()))
    }
}

/// Built-in campus table used when no lots.json exists
pub fn default_lots() -> Vec<Lot> {
    let c = |lat, lng| Endpoint::Coord(Coord { lat, lng });
    vec![
        Lot {
            name: "ARC Parking".to_string(),
            bounds: Some(Bounds {
                north: 38.543615,
                south: 38.542556,
                east: -121.756449,
                west: -121.758688,
            }),
            anchor: None,
            rows: vec![
                Row {
                    start: c(38.543574, -121.758342),
                    end: c(38.543564, -121.757409),
                    count: 32,
                    available: 15,
                },
                Row {
                    start: c(38.543449, -121.758558),
                    end: c(38.543435, -121.756670),
                    count: 64,
                    available: 28,
                },
            ],
        },
        Lot {
            name: "Visitor Parking Lot 47".to_string(),
            bounds: Some(Bounds {
                north: 38.535284,
                south: 38.534403,
                east: -121.755545,
                west: -121.757367,
            }),
            anchor: None,
            rows: vec![Row {
                start: c(38.535221, -121.756104),
                end: c(38.535215, -121.755596),
                count: 18,
                available: 10,
            }],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(count: u32, available: u32) -> Row<Coord> {
        let p = Coord { lat: 0.0, lng: 0.0 };
        Row { start: p, end: p, count, available }
    }

    fn lot(rows: Vec<Row<Coord>>) -> ResolvedLot {
        Lot {
            name: "t".to_string(),
            bounds: None,
            anchor: Some(Coord { lat: 1.0, lng: 1.0 }),
            rows,
        }
    }

    #[test]
    fn default_table_is_valid() {
        let lots = default_lots();
        assert_eq!(lots.len(), 2);
        for l in &lots {
            l.validate().unwrap();
        }
        assert_eq!(lots[0].total(), 96);
        assert_eq!(lots[0].available(), 43);
    }

    #[test]
    fn available_over_count_rejected() {
        let err = lot(vec![row(4, 2), row(3, 4)]).validate().unwrap_err();
        assert_eq!(
            err,
            LotError::AvailableExceedsCount { row: 1, available: 4, count: 3 }
        );
    }

    #[test]
    fn zero_count_rejected() {
        assert_eq!(
            lot(vec![row(0, 0)]).validate().unwrap_err(),
            LotError::RowCount { row: 0 }
        );
    }

    #[test]
    fn oversized_lot_rejected_without_overflow() {
        let l = lot(vec![row(3_000_000_000, 0), row(3_000_000_000, 0)]);
        assert_eq!(l.validate().unwrap_err(), LotError::TooManySpots { total: 6_000_000_000 });
        assert_eq!(l.total(), u32::MAX);

        let at_cap = lot(vec![row(MAX_SPOTS_PER_LOT as u32, 0)]);
        assert!(at_cap.validate().is_ok());
    }

    #[test]
    fn needs_position() {
        let mut l = lot(vec![row(1, 1)]);
        l.anchor = None;
        assert_eq!(l.validate().unwrap_err(), LotError::NoPosition);
        l.bounds = Some(Bounds { north: 2.0, south: 0.0, east: 2.0, west: 0.0 });
        assert!(l.validate().is_ok());
        assert_eq!(l.marker_position(), Some(Coord { lat: 1.0, lng: 1.0 }));
    }

    #[test]
    fn endpoint_deserializes_both_forms() {
        let e: Endpoint = serde_json::from_str(r#"{"lat": 1.5, "lng": 2.5}"#).unwrap();
        assert_eq!(e, Endpoint::Coord(Coord { lat: 1.5, lng: 2.5 }));
        let e: Endpoint = serde_json::from_str(r#""QQ3J+6J Davis""#).unwrap();
        assert_eq!(e, Endpoint::Address("QQ3J+6J Davis".to_string()));
    }
}
