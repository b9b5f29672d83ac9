//! Occupancy-driven colors and icons.
//!
//! Regions use a continuous green -> red gradient on the occupancy ratio.
//! Lot icons use three discrete tiers on the availability ratio.
//! Everything here is a pure function of (available, total).

use serde::Serialize;
use std::fmt;

pub const GREEN: &str = "#70e000";
pub const AMBER: &str = "#ffbe0b";
pub const RED: &str = "#ff006e";

const LOT_ICON_SCALE: f64 = 12.0;
const SPOT_ICON_SCALE: f64 = 6.0;
const ICON_OPACITY: f64 = 0.9;
const LABEL_COLOR: &str = "#ffffff";
const LABEL_FONT_SIZE: &str = "14px";

const REGION_OPACITY: f64 = 0.6;
const REGION_OPACITY_HOVER: f64 = 0.8;
const REGION_STROKE_WEIGHT: f64 = 1.0;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Availability tier for lot icons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Green,
    Amber,
    Red,
}

impl Tier {
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Green => GREEN,
            Tier::Amber => AMBER,
            Tier::Red => RED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub color: &'static str,
    pub font_size: &'static str,
    pub bold: bool,
}

/// Circle marker style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
}

/// Filled rectangle style. The map raises fill opacity to
/// `hover_fill_opacity` while the pointer is over the region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStyle {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub hover_fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_weight: f64,
}

/// Fraction of capacity occupied. `total` must be non-zero.
pub fn occupancy_ratio(available: u32, total: u32) -> f64 {
    debug_assert!(total > 0 && available <= total);
    (total - available.min(total)) as f64 / total as f64
}

/// Linear green (empty) -> red (full) gradient
pub fn occupancy_color(available: u32, total: u32) -> Rgb {
    let ratio = occupancy_ratio(available, total);
    Rgb {
        r: (255.0 * ratio).floor() as u8,
        g: (255.0 * (1.0 - ratio)).floor() as u8,
        b: 0,
    }
}

pub fn tier(available: u32, total: u32) -> Tier {
    let ratio = available as f64 / total as f64;
    if ratio > 0.5 {
        Tier::Green
    } else if ratio > 0.2 {
        Tier::Amber
    } else {
        Tier::Red
    }
}

/// Lot marker: tier-colored circle labelled with the available count
pub fn lot_icon(available: u32, total: u32) -> MarkerStyle {
    MarkerStyle {
        fill_color: tier(available, total).color().to_string(),
        fill_opacity: ICON_OPACITY,
        scale: LOT_ICON_SCALE,
        label: Some(Label {
            text: available.to_string(),
            color: LABEL_COLOR,
            font_size: LABEL_FONT_SIZE,
            bold: true,
        }),
    }
}

pub fn spot_icon(available: bool) -> MarkerStyle {
    MarkerStyle {
        fill_color: if available { GREEN } else { RED }.to_string(),
        fill_opacity: ICON_OPACITY,
        scale: SPOT_ICON_SCALE,
        label: None,
    }
}

pub fn region_style(available: u32, total: u32) -> RegionStyle {
    let color = occupancy_color(available, total).css();
    RegionStyle {
        fill_color: color.clone(),
        fill_opacity: REGION_OPACITY,
        hover_fill_opacity: REGION_OPACITY_HOVER,
        stroke_color: color,
        stroke_weight: REGION_STROKE_WEIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lot_is_green_full_lot_is_red() {
        assert_eq!(occupancy_color(40, 40), Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(occupancy_color(0, 40), Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(occupancy_color(0, 40).css(), "rgb(255,0,0)");
        assert_eq!(occupancy_color(40, 40).hex(), "#00ff00");
    }

    #[test]
    fn redness_increases_as_availability_drops() {
        let total = 96;
        let mut last_red = 0;
        let mut last_green = 255;
        for available in (0..=total).rev() {
            let c = occupancy_color(available, total);
            assert!(c.r >= last_red);
            assert!(c.g <= last_green);
            last_red = c.r;
            last_green = c.g;
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tier(51, 100), Tier::Green);
        assert_eq!(tier(50, 100), Tier::Amber);
        assert_eq!(tier(21, 100), Tier::Amber);
        assert_eq!(tier(20, 100), Tier::Red);
        assert_eq!(tier(0, 100), Tier::Red);
        assert_eq!(tier(1, 1), Tier::Green);
    }

    #[test]
    fn lot_icon_label_is_available_count() {
        let icon = lot_icon(43, 96);
        assert_eq!(icon.fill_color, AMBER);
        assert_eq!(icon.label.unwrap().text, "43");
    }

    #[test]
    fn region_hover_raises_opacity() {
        let s = region_style(10, 18);
        assert_eq!(s.fill_color, s.stroke_color);
        assert_eq!(s.fill_opacity, 0.6);
        assert_eq!(s.hover_fill_opacity, 0.8);
    }

    #[test]
    fn spot_icon_colors() {
        assert_eq!(spot_icon(true).fill_color, GREEN);
        assert_eq!(spot_icon(false).fill_color, RED);
    }
}
