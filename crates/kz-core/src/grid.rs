//! Column/baseline grid and the snapping rules that go with it.
//!
//! Snapping is soft: values near a guide jump onto it, everything else
//! passes through unchanged. The x scan is first-hit in ascending guide
//! order, not nearest-of-all.

use serde::{Deserialize, Serialize};

/// Distance from a baseline multiple that still snaps on the y axis.
pub const BASELINE_TOLERANCE: f32 = 5.0;
/// Distance from the left/right margin that snaps on the x axis.
pub const MARGIN_TOLERANCE: f32 = 10.0;
/// Distance from a column start/end that snaps on the x axis.
pub const COLUMN_TOLERANCE: f32 = 8.0;

/// Values this close to a guide are treated as already on it.
const ON_GUIDE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub columns: u32,
    pub gutter: f32,
    pub margin: f32,
    pub baseline: f32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub width: f32,
    pub height: f32,
}

fn default_visible() -> bool {
    true
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 12,
            gutter: 24.0,
            margin: 48.0,
            baseline: 18.0,
            visible: true,
            width: 595.0,
            height: 842.0,
        }
    }
}

impl GridConfig {
    /// Reject configurations the snapping math cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.columns == 0 {
            return Err("grid must have at least one column".into());
        }
        if !(self.baseline > 0.0) {
            return Err(format!("baseline must be positive, got {}", self.baseline));
        }
        if !(self.gutter >= 0.0) || !(self.margin >= 0.0) {
            return Err("gutter and margin must not be negative".into());
        }
        if !(self.width > 0.0) || !(self.height > 0.0) {
            return Err(format!(
                "artboard must have a positive size, got {}x{}",
                self.width, self.height
            ));
        }
        if self.width <= 2.0 * self.margin {
            return Err(format!(
                "artboard width {} leaves no room inside margins of {}",
                self.width, self.margin
            ));
        }
        Ok(())
    }

    pub fn column_width(&self) -> f32 {
        let cols = self.columns as f32;
        (self.width - 2.0 * self.margin - (cols - 1.0) * self.gutter) / cols
    }

    /// `(start, end)` of every column boundary `i in 0..=columns`.
    pub fn column_edges(&self) -> Vec<(f32, f32)> {
        let w = self.column_width();
        (0..=self.columns)
            .map(|i| {
                let start = self.margin + i as f32 * (w + self.gutter);
                (start, start + w)
            })
            .collect()
    }

    pub fn right_margin(&self) -> f32 {
        self.width - self.margin
    }

    fn x_guides(&self) -> impl Iterator<Item = f32> + '_ {
        [self.margin, self.right_margin()]
            .into_iter()
            .chain(self.column_edges().into_iter().flat_map(|(s, e)| [s, e]))
    }
}

/// Snap a coordinate on one axis. See the module docs for the rules.
pub fn snap(value: f32, axis: Axis, config: &GridConfig) -> f32 {
    match axis {
        Axis::Y => snap_baseline(value, config.baseline),
        Axis::X => snap_columns(value, config),
    }
}

fn snap_baseline(value: f32, baseline: f32) -> f32 {
    if !(baseline > 0.0) {
        return value;
    }
    let remainder = value.rem_euclid(baseline);
    if remainder < BASELINE_TOLERANCE || remainder > baseline - BASELINE_TOLERANCE {
        (value / baseline).round() * baseline
    } else {
        value
    }
}

fn snap_columns(value: f32, config: &GridConfig) -> f32 {
    // Already on a guide: stay put, even if an earlier guide is also in range.
    if config
        .x_guides()
        .any(|g| (value - g).abs() <= ON_GUIDE_EPSILON)
    {
        return value;
    }

    if (value - config.margin).abs() < MARGIN_TOLERANCE {
        return config.margin;
    }
    let right = config.right_margin();
    if (value - right).abs() < MARGIN_TOLERANCE {
        return right;
    }

    for (start, end) in config.column_edges() {
        if (value - start).abs() < COLUMN_TOLERANCE {
            return start;
        }
        if (value - end).abs() < COLUMN_TOLERANCE {
            return end;
        }
    }
    value
}
