use crate::brush::{self, HueCounter};
use crate::grid::Grid;
use crate::physics;
use crate::settings::SimulationSettings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Pointer buttons as delivered by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Falling-sand simulation state: double-buffered grid, hue counter and RNG
pub struct SandSimulation {
    /// Grid being displayed and painted into
    current: Grid,
    /// Scratch buffer the stepper writes into, swapped in after each tick
    next: Grid,
    hue: HueCounter,
    rng: StdRng,
    pub settings: SimulationSettings,
    pub paused: bool,
    ticks: u64,
    moved_last_tick: usize,
}

impl SandSimulation {
    /// Create a simulation; `seed` makes every random choice reproducible
    pub fn new(cols: usize, rows: usize, settings: SimulationSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            current: Grid::new(cols, rows),
            next: Grid::new(cols, rows),
            hue: HueCounter::new(settings.initial_hue),
            rng,
            settings,
            paused: false,
            ticks: 0,
            moved_last_tick: 0,
        }
    }

    /// Size the grid to a viewport using the configured cell size
    pub fn from_viewport(width: usize, height: usize, settings: SimulationSettings, seed: Option<u64>) -> Self {
        let grid = Grid::from_viewport(width, height, settings.cell_size);
        Self::new(grid.cols(), grid.rows(), settings, seed)
    }

    pub fn grid(&self) -> &Grid {
        &self.current
    }

    pub fn cols(&self) -> usize {
        self.current.cols()
    }

    pub fn rows(&self) -> usize {
        self.current.rows()
    }

    /// Hue the next spawn gesture will use
    pub fn hue(&self) -> u16 {
        self.hue.current()
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn particle_count(&self) -> usize {
        self.current.occupied_count()
    }

    pub fn moved_last_tick(&self) -> usize {
        self.moved_last_tick
    }

    /// Advance one tick unless paused. Returns true if a step ran.
    pub fn step(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.step_once();
        true
    }

    /// Advance exactly one tick, even while paused
    pub fn step_once(&mut self) {
        self.moved_last_tick = physics::step(
            &self.current,
            &mut self.next,
            self.settings.gravity,
            &mut self.rng,
        );
        std::mem::swap(&mut self.current, &mut self.next);
        self.ticks += 1;
    }

    /// Paint with the brush at `(col, row)` and advance the hue
    pub fn spawn_at(&mut self, col: isize, row: isize) -> usize {
        let hue = self.hue.current();
        let brush = self.settings.brush();
        let written = brush::spawn(&mut self.current, col, row, hue, &brush, &mut self.rng);
        self.hue.advance();
        debug!(col, row, hue, written, "spawned grains");
        written
    }

    /// Pointer pressed: only the primary button paints
    pub fn pointer_down(&mut self, col: isize, row: isize, button: PointerButton) -> usize {
        match button {
            PointerButton::Primary => self.spawn_at(col, row),
            _ => 0,
        }
    }

    /// Pointer moved: paints on every move while the primary button is held
    pub fn pointer_move(&mut self, col: isize, row: isize, held: Option<PointerButton>) -> usize {
        match held {
            Some(PointerButton::Primary) => self.spawn_at(col, row),
            _ => 0,
        }
    }

    /// Remove every grain; the hue counter keeps cycling
    pub fn clear(&mut self) {
        self.current.clear();
        self.next.clear();
        self.moved_last_tick = 0;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(cols: usize, rows: usize) -> SandSimulation {
        SandSimulation::new(cols, rows, SimulationSettings::default(), Some(99))
    }

    #[test]
    fn test_from_viewport_uses_cell_size() {
        let settings = SimulationSettings {
            cell_size: 5,
            ..Default::default()
        };
        let sim = SandSimulation::from_viewport(600, 500, settings, Some(1));
        assert_eq!((sim.cols(), sim.rows()), (120, 100));
    }

    #[test]
    fn test_only_primary_button_paints() {
        let mut sim = sim(20, 20);
        assert_eq!(sim.pointer_down(10, 10, PointerButton::Secondary), 0);
        assert_eq!(sim.pointer_move(10, 10, None), 0);
        assert_eq!(sim.pointer_move(10, 10, Some(PointerButton::Middle)), 0);
        assert_eq!(sim.particle_count(), 0);
        assert_eq!(sim.hue(), 200);

        assert!(sim.pointer_down(10, 10, PointerButton::Primary) > 0);
        assert_eq!(sim.hue(), 201);
        sim.pointer_move(11, 10, Some(PointerButton::Primary));
        assert_eq!(sim.hue(), 202);
    }

    #[test]
    fn test_spawned_grains_carry_hue() {
        let mut sim = sim(20, 20);
        sim.pointer_down(10, 10, PointerButton::Primary);
        for (_, _, cell) in sim.grid().occupied() {
            assert_eq!(cell.color_code, 200);
            assert_eq!(cell.velocity, 1);
        }
    }

    #[test]
    fn test_hue_returns_after_full_cycle() {
        let settings = SimulationSettings {
            initial_hue: 1,
            ..Default::default()
        };
        let mut sim = SandSimulation::new(15, 15, settings, Some(5));
        for _ in 0..360 {
            sim.pointer_down(7, 7, PointerButton::Primary);
            assert_ne!(sim.hue(), 0);
        }
        assert_eq!(sim.hue(), 1);
    }

    #[test]
    fn test_step_conserves_grains() {
        let mut sim = sim(40, 30);
        for col in (5..35).step_by(6) {
            sim.pointer_down(col, 3, PointerButton::Primary);
        }
        let count = sim.particle_count();
        for _ in 0..200 {
            assert!(sim.step());
            assert_eq!(sim.particle_count(), count);
        }
        assert_eq!(sim.tick_count(), 200);
        // Everything has settled by now
        assert_eq!(sim.moved_last_tick(), 0);
    }

    #[test]
    fn test_pause_and_single_step() {
        let mut sim = sim(10, 10);
        sim.pointer_down(5, 0, PointerButton::Primary);
        sim.toggle_pause();
        let before = sim.grid().clone();

        assert!(!sim.step());
        assert_eq!(sim.grid(), &before);
        assert_eq!(sim.tick_count(), 0);

        sim.step_once();
        assert_eq!(sim.tick_count(), 1);
        assert_ne!(sim.grid(), &before);
    }

    #[test]
    fn test_same_seed_same_history() {
        let run = || {
            let mut sim = sim(30, 30);
            sim.pointer_down(15, 5, PointerButton::Primary);
            for _ in 0..20 {
                sim.step();
            }
            sim.grid().clone()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_clear_and_degenerate_grid() {
        let mut sim = sim(10, 10);
        sim.pointer_down(5, 5, PointerButton::Primary);
        sim.clear();
        assert_eq!(sim.particle_count(), 0);

        let mut empty = sim_zero();
        assert_eq!(empty.pointer_down(0, 0, PointerButton::Primary), 0);
        assert!(empty.step());
        assert_eq!(empty.particle_count(), 0);
    }

    fn sim_zero() -> SandSimulation {
        SandSimulation::from_viewport(0, 0, SimulationSettings::default(), Some(0))
    }
}
