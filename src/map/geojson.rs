//! In-memory map that exports what is visible as GeoJSON.

use std::collections::BTreeMap;
use std::sync::mpsc;

use serde_json::{json, Value};

use super::{Handle, MapProvider};
use crate::geo::{Bounds, Coord};
use crate::style::{MarkerStyle, RegionStyle};

struct Feature {
    geometry: Value,
    properties: Value,
    visible: bool,
}

pub struct GeoJsonMap {
    features: BTreeMap<Handle, Feature>,
    next_id: u64,
    zoom: f64,
    center: Coord,
    listeners: Vec<mpsc::Sender<f64>>,
}

impl GeoJsonMap {
    pub fn new(center: Coord, zoom: f64) -> Self {
        Self {
            features: BTreeMap::new(),
            next_id: 1,
            zoom,
            center,
            listeners: Vec::new(),
        }
    }

    /// Change zoom and notify every live listener
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.listeners.retain(|tx| tx.send(zoom).is_ok());
    }

    pub fn pan_to(&mut self, center: Coord) {
        self.center = center;
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn visible_count(&self) -> usize {
        self.features.values().filter(|f| f.visible).count()
    }

    pub fn to_feature_collection(&self) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .filter(|(_, f)| f.visible)
            .map(|(h, f)| {
                json!({
                    "type": "Feature",
                    "id": h.0,
                    "geometry": f.geometry,
                    "properties": f.properties,
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "properties": {
                "zoom": self.zoom,
                "center": [self.center.lng, self.center.lat],
            },
            "features": features,
        })
    }

    fn insert(&mut self, geometry: Value, properties: Value) -> Handle {
        let handle = Handle(self.next_id);
        self.next_id += 1;
        self.features.insert(
            handle,
            Feature {
                geometry,
                properties,
                visible: true,
            },
        );
        handle
    }
}

impl MapProvider for GeoJsonMap {
    fn render_marker(&mut self, at: Coord, style: &MarkerStyle, title: &str) -> Handle {
        let mut properties = json!({ "title": title, "kind": "marker" });
        if let (Value::Object(props), Ok(Value::Object(s))) =
            (&mut properties, serde_json::to_value(style))
        {
            props.extend(s);
        }
        self.insert(
            json!({ "type": "Point", "coordinates": [at.lng, at.lat] }),
            properties,
        )
    }

    fn render_region(&mut self, bounds: Bounds, style: &RegionStyle, title: &str) -> Handle {
        let mut properties = json!({ "title": title, "kind": "region" });
        if let (Value::Object(props), Ok(Value::Object(s))) =
            (&mut properties, serde_json::to_value(style))
        {
            props.extend(s);
        }
        self.insert(
            json!({ "type": "Polygon", "coordinates": [bounds.ring()] }),
            properties,
        )
    }

    fn set_visible(&mut self, handle: Handle, visible: bool) {
        if let Some(f) = self.features.get_mut(&handle) {
            f.visible = visible;
        }
    }

    fn remove(&mut self, handle: Handle) {
        self.features.remove(&handle);
    }

    fn current_zoom(&self) -> f64 {
        self.zoom
    }

    fn zoom_events(&mut self) -> mpsc::Receiver<f64> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style;

    fn map() -> GeoJsonMap {
        GeoJsonMap::new(Coord { lat: 38.538066, lng: -121.753007 }, 15.0)
    }

    #[test]
    fn hidden_features_are_not_exported() {
        let mut m = map();
        let a = m.render_marker(Coord { lat: 1.0, lng: 2.0 }, &style::spot_icon(true), "a");
        let b = m.render_marker(Coord { lat: 3.0, lng: 4.0 }, &style::spot_icon(false), "b");
        m.set_visible(a, false);

        let fc = m.to_feature_collection();
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["id"], json!(b.0));
        assert_eq!(features[0]["geometry"]["coordinates"], json!([4.0, 3.0]));
        assert_eq!(features[0]["properties"]["fill_color"], json!(style::RED));
    }

    #[test]
    fn region_is_closed_polygon() {
        let mut m = map();
        let bounds = Bounds { north: 1.0, south: 0.0, east: 1.0, west: 0.0 };
        m.render_region(bounds, &style::region_style(1, 2), "lot");
        let fc = m.to_feature_collection();
        let ring = &fc["features"][0]["geometry"]["coordinates"][0];
        assert_eq!(ring.as_array().unwrap().len(), 5);
        assert_eq!(ring[0], ring[4]);

        let props = &fc["features"][0]["properties"];
        assert_eq!(props["kind"], json!("region"));
        assert_eq!(props["fill_opacity"], json!(0.6));
        assert_eq!(props["hover_fill_opacity"], json!(0.8));
    }

    #[test]
    fn remove_forgets_handle() {
        let mut m = map();
        let h = m.render_marker(Coord { lat: 1.0, lng: 2.0 }, &style::spot_icon(true), "a");
        m.remove(h);
        assert_eq!(m.len(), 0);
        m.remove(h);
    }

    #[test]
    fn zoom_changes_reach_listeners() {
        let mut m = map();
        let rx = m.zoom_events();
        m.set_zoom(18.0);
        m.set_zoom(16.0);
        assert_eq!(rx.try_recv(), Ok(18.0));
        assert_eq!(rx.try_recv(), Ok(16.0));
        assert_eq!(m.current_zoom(), 16.0);

        drop(rx);
        m.set_zoom(12.0);
        assert!(m.listeners.is_empty());
    }
}
