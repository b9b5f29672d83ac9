//! Map provider interface.
//!
//! The map widget is external; this is the capability set the view needs
//! from it. `geojson` is the provider shipped with the binary.

pub mod geojson;

use std::sync::mpsc;

use crate::geo::{Bounds, Coord};
use crate::style::{MarkerStyle, RegionStyle};

/// Opaque id of something the provider has drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

pub trait MapProvider {
    fn render_marker(&mut self, at: Coord, style: &MarkerStyle, title: &str) -> Handle;
    fn render_region(&mut self, bounds: Bounds, style: &RegionStyle, title: &str) -> Handle;
    fn set_visible(&mut self, handle: Handle, visible: bool);
    /// Take the feature off the map for good. Unknown handles are ignored.
    fn remove(&mut self, handle: Handle);
    fn current_zoom(&self) -> f64;
    /// New zoom levels, in the order the provider saw them
    fn zoom_events(&mut self) -> mpsc::Receiver<f64>;
}
