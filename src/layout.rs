//! Spot generation for resolved lots.

use crate::geo::{self, Coord, InvalidCoordinate};
use crate::lot::{LotError, ResolvedLot, Row};
use crate::occupancy::OccupancySource;
use crate::style;

/// One parking space. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spot {
    pub position: Coord,
    pub available: bool,
}

/// Per-lot availability as seen by the current occupancy source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LotSummary {
    pub available: u32,
    pub total: u32,
}

impl LotSummary {
    pub fn from_spots(spots: &[Spot]) -> Self {
        Self {
            available: spots.iter().filter(|s| s.available).count() as u32,
            total: spots.len() as u32,
        }
    }

    pub fn occupancy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        style::occupancy_ratio(self.available, self.total)
    }
}

pub fn layout_row<S: OccupancySource>(
    lot: &str,
    row: &Row<Coord>,
    source: &mut S,
) -> Result<Vec<Spot>, InvalidCoordinate> {
    let positions = geo::interpolate(row.start, row.end, row.count as usize)?;
    let flags = source.availability(lot, row.count, row.available);
    Ok(positions
        .into_iter()
        .zip(flags.into_iter().chain(std::iter::repeat(false)))
        .map(|(position, available)| Spot { position, available })
        .collect())
}

/// Every spot of the lot, rows concatenated in order. The lot is validated
/// first so an oversized or malformed table never reaches allocation.
pub fn layout_lot<S: OccupancySource>(
    lot: &ResolvedLot,
    source: &mut S,
) -> Result<Vec<Spot>, LotError> {
    lot.validate()?;
    let mut spots = Vec::with_capacity(lot.total() as usize);
    for row in &lot.rows {
        spots.extend(layout_row(&lot.name, row, source)?);
    }
    Ok(spots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::Lot;
    use crate::occupancy::{ConfiguredOccupancy, SimulatedOccupancy};

    fn c(lat: f64, lng: f64) -> Coord {
        Coord { lat, lng }
    }

    fn arc_lot() -> ResolvedLot {
        Lot {
            name: "ARC Parking".to_string(),
            bounds: None,
            anchor: Some(c(38.543, -121.757)),
            rows: vec![
                Row { start: c(38.543574, -121.758342), end: c(38.543564, -121.757409), count: 32, available: 15 },
                Row { start: c(38.543449, -121.758558), end: c(38.543435, -121.756670), count: 64, available: 28 },
            ],
        }
    }

    #[test]
    fn row_of_32_with_15_free() {
        let lot = arc_lot();
        let spots = layout_row(&lot.name, &lot.rows[0], &mut ConfiguredOccupancy).unwrap();
        assert_eq!(spots.len(), 32);
        assert!(spots[..15].iter().all(|s| s.available));
        assert!(spots[15..].iter().all(|s| !s.available));
        assert_eq!(spots[0].position, lot.rows[0].start);
        assert_eq!(spots[31].position, lot.rows[0].end);
    }

    #[test]
    fn lot_concatenates_rows() {
        let spots = layout_lot(&arc_lot(), &mut ConfiguredOccupancy).unwrap();
        assert_eq!(spots.len(), 96);
        let summary = LotSummary::from_spots(&spots);
        assert_eq!(summary, LotSummary { available: 43, total: 96 });
    }

    #[test]
    fn simulated_summary_matches_flags() {
        let mut source = SimulatedOccupancy::new(3, 0.5);
        let spots = layout_lot(&arc_lot(), &mut source).unwrap();
        let summary = LotSummary::from_spots(&spots);
        assert_eq!(summary.total, 96);
        assert!(summary.available <= 96);
    }

    #[test]
    fn bad_row_coordinate_is_an_error() {
        let mut lot = arc_lot();
        lot.rows[1].end = c(f64::NAN, 0.0);
        assert!(matches!(
            layout_lot(&lot, &mut ConfiguredOccupancy),
            Err(LotError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn oversized_lot_is_an_error_not_a_panic() {
        let mut lot = arc_lot();
        lot.rows[0].count = 3_000_000_000;
        lot.rows[1].count = 3_000_000_000;
        assert!(matches!(
            layout_lot(&lot, &mut ConfiguredOccupancy),
            Err(LotError::TooManySpots { total: 6_000_000_000 })
        ));
    }
}
