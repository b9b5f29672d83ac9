//! Owned view state: everything currently drawn on the map.
//!
//! Two layers. The lot layer (one region + one labelled marker per lot) is
//! shown at or below the zoom threshold. The spot layer (one marker per
//! spot) only exists above it: its markers are created when the view crosses
//! into spot level and removed when it leaves.
//!
//! Layers are always replaced whole, never patched.

use log::{debug, error, info};

use crate::layout::{self, LotSummary, Spot};
use crate::lot::ResolvedLot;
use crate::map::{Handle, MapProvider};
use crate::occupancy::OccupancySource;
use crate::style;

/// One lot as currently shown
pub struct LotView {
    pub name: String,
    pub summary: LotSummary,
    spots: Vec<Spot>,
    marker: Option<Handle>,
    region: Option<Handle>,
}

pub struct ViewState<S: OccupancySource> {
    source: S,
    threshold: f64,
    lots: Vec<LotView>,
    spot_markers: Vec<Handle>,
    showing_spots: bool,
}

impl<S: OccupancySource> ViewState<S> {
    /// Draw the lot layer for `lots` and match it to the map's current zoom
    pub fn create<M: MapProvider>(
        map: &mut M,
        lots: &[ResolvedLot],
        source: S,
        threshold: f64,
    ) -> Self {
        let mut view = Self {
            source,
            threshold,
            lots: Vec::new(),
            spot_markers: Vec::new(),
            showing_spots: false,
        };
        view.build(map, lots);
        view
    }

    /// Dispose everything, sample occupancy again and redraw
    pub fn replace<M: MapProvider>(&mut self, map: &mut M, lots: &[ResolvedLot]) {
        self.dispose(map);
        self.build(map, lots);
    }

    /// Remove every handle this view owns from the map
    pub fn dispose<M: MapProvider>(&mut self, map: &mut M) {
        self.clear_spots(map);
        for lot in self.lots.drain(..) {
            if let Some(h) = lot.marker {
                map.remove(h);
            }
            if let Some(h) = lot.region {
                map.remove(h);
            }
        }
        self.showing_spots = false;
    }

    /// Switch layers for a new zoom level
    pub fn apply_zoom<M: MapProvider>(&mut self, map: &mut M, zoom: f64) {
        let show_spots = zoom > self.threshold;
        debug!("Zoom {zoom}: {}", if show_spots { "spots" } else { "lots" });

        for lot in &self.lots {
            for h in lot.marker.iter().chain(lot.region.iter()) {
                map.set_visible(*h, !show_spots);
            }
        }

        if show_spots && !self.showing_spots {
            self.draw_spots(map);
        } else if !show_spots && self.showing_spots {
            self.clear_spots(map);
        }
        self.showing_spots = show_spots;
    }

    pub fn showing_spots(&self) -> bool {
        self.showing_spots
    }

    pub fn lots(&self) -> &[LotView] {
        &self.lots
    }

    pub fn spot_marker_count(&self) -> usize {
        self.spot_markers.len()
    }

    fn build<M: MapProvider>(&mut self, map: &mut M, lots: &[ResolvedLot]) {
        for lot in lots {
            let spots = match layout::layout_lot(lot, &mut self.source) {
                Ok(s) => s,
                Err(e) => {
                    error!("Error creating {}: {}", lot.name, e);
                    continue;
                }
            };
            let summary = LotSummary::from_spots(&spots);
            if summary.total == 0 {
                continue;
            }

            let region = lot.bounds.map(|b| {
                let style = style::region_style(summary.available, summary.total);
                map.render_region(b, &style, &lot.name)
            });
            let marker = lot.marker_position().map(|at| {
                let icon = style::lot_icon(summary.available, summary.total);
                map.render_marker(at, &icon, &lot.name)
            });

            self.lots.push(LotView {
                name: lot.name.clone(),
                summary,
                spots,
                marker,
                region,
            });
        }
        info!("View built: {} lots", self.lots.len());

        let zoom = map.current_zoom();
        self.apply_zoom(map, zoom);
    }

    fn draw_spots<M: MapProvider>(&mut self, map: &mut M) {
        self.clear_spots(map);
        for lot in &self.lots {
            for (i, spot) in lot.spots.iter().enumerate() {
                let title = format!("{} #{}", lot.name, i + 1);
                let h = map.render_marker(spot.position, &style::spot_icon(spot.available), &title);
                self.spot_markers.push(h);
            }
        }
        debug!("Drew {} spot markers", self.spot_markers.len());
    }

    fn clear_spots<M: MapProvider>(&mut self, map: &mut M) {
        for h in self.spot_markers.drain(..) {
            map.remove(h);
        }
    }
}
