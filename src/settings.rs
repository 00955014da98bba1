use crate::brush::{Brush, SEED_HUE};
use crate::physics::DEFAULT_GRAVITY;
use serde::{Deserialize, Serialize};

/// Color mode - how occupied cells are painted
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Plain white grains, like the original window renderer
    #[default]
    White,
    /// Each grain in the hue it was spawned with
    Hue,
    /// Shade by stored velocity
    Velocity,
}

impl ColorMode {
    pub fn name(&self) -> &str {
        match self {
            ColorMode::White => "White",
            ColorMode::Hue => "Hue",
            ColorMode::Velocity => "Velocity",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ColorMode::White => ColorMode::Hue,
            ColorMode::Hue => ColorMode::Velocity,
            ColorMode::Velocity => ColorMode::White,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ColorMode::White => ColorMode::Velocity,
            ColorMode::Hue => ColorMode::White,
            ColorMode::Velocity => ColorMode::Hue,
        }
    }
}

/// All simulation settings consolidated into one struct
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Acceleration added per tick (0.0-2.0). Only its whole part is kept in
    /// the stored velocity.
    pub gravity: f64,
    /// Brush side length in cells (odd, 1-15)
    pub brush_size: usize,
    /// Chance each brush cell is filled (0.05-1.0)
    pub spawn_probability: f64,
    /// Hue of the first spawn gesture (1-360)
    pub initial_hue: u16,
    /// Braille dots per cell side (1-8)
    pub cell_size: usize,
    pub color_mode: ColorMode,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let brush = Brush::default();
        Self {
            gravity: DEFAULT_GRAVITY,
            brush_size: brush.size,
            spawn_probability: brush.probability,
            initial_hue: SEED_HUE,
            cell_size: 1,
            color_mode: ColorMode::default(),
        }
    }
}

impl SimulationSettings {
    pub fn brush(&self) -> Brush {
        Brush {
            size: self.brush_size,
            probability: self.spawn_probability,
        }
    }

    /// Pull every field back into its valid range (used after CLI/config input)
    pub fn sanitize(&mut self) {
        self.gravity = self.gravity.clamp(0.0, 2.0);
        self.brush_size = (self.brush_size.clamp(1, 15) / 2) * 2 + 1;
        self.spawn_probability = self.spawn_probability.clamp(0.05, 1.0);
        self.initial_hue = self.initial_hue.clamp(1, 360);
        self.cell_size = self.cell_size.clamp(1, 8);
    }

    /// Adjust gravity within bounds
    pub fn adjust_gravity(&mut self, delta: f64) {
        // Round to kill float drift from repeated 0.1 steps
        self.gravity = ((self.gravity + delta) * 100.0).round() / 100.0;
        self.gravity = self.gravity.clamp(0.0, 2.0);
    }

    /// Grow or shrink the brush by one ring, keeping it odd
    pub fn adjust_brush_size(&mut self, rings: i32) {
        let size = self.brush_size as i32 + rings * 2;
        self.brush_size = size.clamp(1, 15) as usize;
    }

    /// Adjust spawn probability within bounds
    pub fn adjust_spawn_probability(&mut self, delta: f64) {
        self.spawn_probability = ((self.spawn_probability + delta) * 100.0).round() / 100.0;
        self.spawn_probability = self.spawn_probability.clamp(0.05, 1.0);
    }
}
