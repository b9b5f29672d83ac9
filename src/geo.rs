//! Coordinates, bounding boxes and linear interpolation between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

/// Error for coordinates that cannot be placed on a map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid coordinate ({}, {})", self.lat, self.lng)
    }
}

impl std::error::Error for InvalidCoordinate {}

impl Coord {
    /// Checked constructor. Rejects NaN/infinite values and anything outside
    /// [-90, 90] x [-180, 180].
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        let c = Self { lat, lng };
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> Result<(), InvalidCoordinate> {
        let ok = self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0;
        if ok {
            Ok(())
        } else {
            Err(InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    /// Parse "LAT,LNG" (whitespace around either part allowed)
    pub fn parse(s: &str) -> Option<Self> {
        let (lat, lng) = s.split_once(',')?;
        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        Self::new(lat, lng).ok()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Axis-aligned lat/lng rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn validate(&self) -> Result<(), InvalidCoordinate> {
        Coord { lat: self.north, lng: self.east }.validate()?;
        Coord { lat: self.south, lng: self.west }.validate()
    }

    pub fn center(&self) -> Coord {
        Coord {
            lat: (self.north + self.south) / 2.0,
            lng: (self.east + self.west) / 2.0,
        }
    }

    /// Closed ring NW -> NE -> SE -> SW -> NW, as [lng, lat] pairs
    pub fn ring(&self) -> [[f64; 2]; 5] {
        [
            [self.west, self.north],
            [self.east, self.north],
            [self.east, self.south],
            [self.west, self.south],
            [self.west, self.north],
        ]
    }
}

/// `count` evenly spaced points from `start` to `end`, both inclusive.
///
/// A single point sits at `start`. Both endpoints are validated first so a
/// bad row never yields a marker.
pub fn interpolate(start: Coord, end: Coord, count: usize) -> Result<Vec<Coord>, InvalidCoordinate> {
    start.validate()?;
    end.validate()?;

    match count {
        0 => Ok(Vec::new()),
        1 => Ok(vec![start]),
        n => {
            let steps = (n - 1) as f64;
            let lat_step = (end.lat - start.lat) / steps;
            let lng_step = (end.lng - start.lng) / steps;
            let mut points: Vec<Coord> = (0..n - 1)
                .map(|i| Coord {
                    lat: start.lat + lat_step * i as f64,
                    lng: start.lng + lng_step * i as f64,
                })
                .collect();
            // Land exactly on the end point instead of accumulating drift
            points.push(end);
            Ok(points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coord {
        Coord { lat, lng }
    }

    #[test]
    fn five_points_along_equator() {
        let pts = interpolate(c(0.0, 0.0), c(10.0, 0.0), 5).unwrap();
        let lats: Vec<f64> = pts.iter().map(|p| p.lat).collect();
        assert_eq!(lats, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert!(pts.iter().all(|p| p.lng == 0.0));
    }

    #[test]
    fn endpoints_are_exact_for_any_count() {
        let s = c(38.543574, -121.758342);
        let e = c(38.543564, -121.757409);
        for n in 2..80 {
            let pts = interpolate(s, e, n).unwrap();
            assert_eq!(pts.len(), n);
            assert!((pts[0].lat - s.lat).abs() < 1e-12);
            assert!((pts[0].lng - s.lng).abs() < 1e-12);
            assert!((pts[n - 1].lat - e.lat).abs() < 1e-12);
            assert!((pts[n - 1].lng - e.lng).abs() < 1e-12);
        }
    }

    #[test]
    fn single_point_is_start() {
        let pts = interpolate(c(1.0, 2.0), c(3.0, 4.0), 1).unwrap();
        assert_eq!(pts, vec![c(1.0, 2.0)]);
    }

    #[test]
    fn zero_points_is_empty() {
        assert!(interpolate(c(1.0, 2.0), c(3.0, 4.0), 0).unwrap().is_empty());
    }

    #[test]
    fn non_finite_fails_fast() {
        assert!(interpolate(c(f64::NAN, 0.0), c(1.0, 1.0), 3).is_err());
        assert!(interpolate(c(0.0, 0.0), c(1.0, f64::INFINITY), 3).is_err());
        assert!(Coord::new(91.0, 0.0).is_err());
    }

    #[test]
    fn parse_lat_lng() {
        assert_eq!(Coord::parse("38.5, -121.7"), Some(c(38.5, -121.7)));
        assert_eq!(Coord::parse("nope"), None);
        assert_eq!(Coord::parse("1,2,3"), None);
        assert_eq!(Coord::parse("200,0"), None);
    }

    #[test]
    fn bounds_center_and_ring() {
        let b = Bounds { north: 2.0, south: 0.0, east: 4.0, west: 2.0 };
        assert_eq!(b.center(), c(1.0, 3.0));
        let ring = b.ring();
        assert_eq!(ring[0], ring[4]);
    }
}
