use crate::grid::Grid;
use rand::Rng;

/// Largest hue before the counter wraps back to 1
pub const MAX_HUE: u16 = 360;

/// Hue the counter starts from
pub const SEED_HUE: u16 = 200;

/// Velocity given to freshly spawned grains
pub const SPAWN_VELOCITY: i32 = 1;

/// Square stochastic brush
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    /// Side length of the square, odd so it centres on the pointer
    pub size: usize,
    /// Chance each cell under the brush is filled
    pub probability: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            size: 5,
            probability: 0.75,
        }
    }
}

impl Brush {
    /// Offset range covered on each axis, e.g. -2..=2 for a 5-wide brush
    pub fn extent(&self) -> isize {
        (self.size / 2) as isize
    }
}

/// Cycling hue assigned to successive spawn gestures. Never yields 0, which
/// marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HueCounter(u16);

impl Default for HueCounter {
    fn default() -> Self {
        Self(SEED_HUE)
    }
}

impl HueCounter {
    /// Start at `hue`, folded into 1..=360
    pub fn new(hue: u16) -> Self {
        Self((hue.saturating_sub(1) % MAX_HUE) + 1)
    }

    pub fn current(&self) -> u16 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = if self.0 >= MAX_HUE { 1 } else { self.0 + 1 };
    }
}

/// Drop grains of `hue` around `(center_col, center_row)`.
///
/// A random draw is made for every brush offset, even ones that fall off the
/// grid, so a seeded RNG gives the same pattern wherever the brush lands.
/// Returns how many cells were written.
pub fn spawn<R: Rng>(
    grid: &mut Grid,
    center_col: isize,
    center_row: isize,
    hue: u16,
    brush: &Brush,
    rng: &mut R,
) -> usize {
    let extent = brush.extent();
    let mut written = 0;

    for di in -extent..=extent {
        for dj in -extent..=extent {
            if rng.gen::<f64>() >= brush.probability {
                continue;
            }
            let col = center_col + di;
            let row = center_row + dj;
            if grid.contains(col, row) {
                grid.set(col as usize, row as usize, hue, SPAWN_VELOCITY);
                written += 1;
            }
        }
    }

    written
}
