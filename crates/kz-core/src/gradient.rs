//! Gradient fills: color stops, interpolation and CSS emission.
//!
//! Stops may be stored in any order. Every consumer goes through
//! [`Gradient::sorted_stops`] so rendering is always ascending by position.

use crate::model::Point;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse `#rrggbb` (leading `#` optional). Anything else is black.
    pub fn from_hex(hex: &str) -> Rgb {
        let h = hex.strip_prefix('#').unwrap_or(hex);
        if h.len() != 6 || !h.is_ascii() {
            return Rgb::BLACK;
        }
        let channel = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).ok();
        match (channel(0), channel(2), channel(4)) {
            (Some(r), Some(g), Some(b)) => Rgb { r, g, b },
            _ => Rgb::BLACK,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A color at a position along the gradient. `position` and `opacity` are
/// percentages (0..100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f32,
    pub color: Rgb,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
    Angular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    /// Degrees on the canvas: 0 points along +x, growing clockwise (y is
    /// down). Used by linear and angular gradients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    /// Center in element UV space (0..1). Radial and angular only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Fraction of the element's half-extent. Radial only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    pub stops: Vec<ColorStop>,
}

/// Interpolated color and opacity at a gradient position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub color: Rgb,
    pub opacity: f32,
}

pub const DEFAULT_CENTER: Point = Point::new(0.5, 0.5);
pub const DEFAULT_RADIUS: f32 = 0.5;

impl Gradient {
    /// Black to white, linear, 0°.
    pub fn default_linear() -> Self {
        Self {
            kind: GradientKind::Linear,
            angle: Some(0.0),
            position: None,
            radius: None,
            stops: vec![
                ColorStop {
                    position: 0.0,
                    color: Rgb::BLACK,
                    opacity: 100.0,
                },
                ColorStop {
                    position: 100.0,
                    color: Rgb::WHITE,
                    opacity: 100.0,
                },
            ],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.stops.len() >= 2
    }

    pub fn angle(&self) -> f32 {
        self.angle.unwrap_or(0.0)
    }

    pub fn center(&self) -> Point {
        self.position.unwrap_or(DEFAULT_CENTER)
    }

    pub fn radius(&self) -> f32 {
        self.radius.unwrap_or(DEFAULT_RADIUS)
    }

    /// `angle` as a CSS bearing, where 0deg points up.
    pub fn css_angle(&self) -> f32 {
        let a = (self.angle() + 90.0).rem_euclid(360.0);
        if a >= 360.0 { 0.0 } else { a }
    }

    /// Radius in element units: `radius` times half the shorter side.
    pub fn radius_px(&self, width: f32, height: f32) -> f32 {
        self.radius() * width.min(height) / 2.0
    }

    pub fn sorted_stops(&self) -> Vec<ColorStop> {
        let mut stops = self.stops.clone();
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        stops
    }

    /// Color at `position` (0..100). Clamped to the end stops outside their
    /// range. `None` when the gradient has no stops.
    pub fn color_at(&self, position: f32) -> Option<Sample> {
        let stops = self.sorted_stops();
        let first = stops.first()?;
        let last = stops.last()?;
        if position <= first.position {
            return Some(Sample {
                color: first.color,
                opacity: first.opacity,
            });
        }
        if position >= last.position {
            return Some(Sample {
                color: last.color,
                opacity: last.opacity,
            });
        }
        let (a, b) = stops
            .windows(2)
            .map(|w| (w[0], w[1]))
            .find(|(_, b)| position <= b.position)?;
        let span = b.position - a.position;
        let t = if span > 0.0 {
            (position - a.position) / span
        } else {
            0.0
        };
        let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
        Some(Sample {
            color: Rgb {
                r: lerp(a.color.r, b.color.r),
                g: lerp(a.color.g, b.color.g),
                b: lerp(a.color.b, b.color.b),
            },
            opacity: a.opacity + (b.opacity - a.opacity) * t,
        })
    }

    /// CSS `background-image` value for an element of the given size.
    pub fn to_css(&self, width: f32, height: f32) -> String {
        let stops = self.css_stops();
        match self.kind {
            GradientKind::Linear => format!("linear-gradient({}deg, {stops})", self.css_angle()),
            GradientKind::Radial => {
                let c = self.center();
                let r = self.radius_px(width, height);
                format!(
                    "radial-gradient(circle {r}px at {}% {}%, {stops})",
                    c.x * 100.0,
                    c.y * 100.0
                )
            }
            GradientKind::Angular => {
                let c = self.center();
                format!(
                    "conic-gradient(from {}deg at {}% {}%, {stops})",
                    self.css_angle(),
                    c.x * 100.0,
                    c.y * 100.0
                )
            }
        }
    }

    fn css_stops(&self) -> String {
        let mut out = String::new();
        for (i, s) in self.sorted_stops().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(
                out,
                "rgba({}, {}, {}, {}) {}%",
                s.color.r,
                s.color.g,
                s.color.b,
                s.opacity / 100.0,
                s.position
            );
        }
        out
    }
}
