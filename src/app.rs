use crate::braille;
use crate::config::AppConfig;
use crate::export::{self, GifRecorder};
use crate::settings::SimulationSettings;
use crate::simulation::{PointerButton, SandSimulation};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::path::PathBuf;
use tracing::{info, warn};

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Gravity,
    Brush,
    Probability,
    ColorMode,
    Speed,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in sidebar order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Gravity,
            Focus::Gravity => Focus::Brush,
            Focus::Brush => Focus::Probability,
            Focus::Probability => Focus::ColorMode,
            Focus::ColorMode => Focus::Speed,
            Focus::Speed => Focus::Controls,
        }
    }

    /// Shift+Tab cycles backward
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Speed,
            Focus::Gravity => Focus::Controls,
            Focus::Brush => Focus::Gravity,
            Focus::Probability => Focus::Brush,
            Focus::ColorMode => Focus::Probability,
            Focus::Speed => Focus::ColorMode,
        }
    }

    /// Get the line index in the parameters box for this focus
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls => 0,
            Focus::Gravity => 0,
            Focus::Brush => 1,
            Focus::Probability => 2,
            Focus::ColorMode => 3,
            Focus::Speed => 4,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

/// Main application state
pub struct App {
    pub simulation: SandSimulation,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub steps_per_frame: usize,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// Where snapshots and recordings are written
    pub export_dir: PathBuf,
    /// Where `save_config` writes; falls back to the user config dir
    pub config_path: Option<PathBuf>,
    /// Last user-facing message (exports, config saves, failures)
    pub status_message: Option<String>,
    recorder: Option<GifRecorder>,
}

impl App {
    /// Size the grid to the canvas; it keeps that size for the whole run
    pub fn new(canvas_width: u16, canvas_height: u16, settings: SimulationSettings, seed: Option<u64>) -> Self {
        let (dots_x, dots_y) = braille::canvas_dots(canvas_width, canvas_height);
        let simulation = SandSimulation::from_viewport(dots_x, dots_y, settings, seed);
        info!(
            cols = simulation.cols(),
            rows = simulation.rows(),
            "sand grid allocated"
        );
        Self {
            simulation,
            focus: Focus::Controls,
            fullscreen_mode: false,
            steps_per_frame: 1,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            export_dir: PathBuf::from("."),
            config_path: None,
            status_message: None,
            recorder: None,
        }
    }

    /// Run simulation steps for current frame
    pub fn tick(&mut self) {
        if self.simulation.paused {
            return;
        }
        for _ in 0..self.steps_per_frame {
            self.simulation.step();
        }
        self.record_frame();
    }

    /// Advance a single step (meant for use while paused)
    pub fn step_once(&mut self) {
        self.simulation.step_once();
        self.record_frame();
    }

    fn record_frame(&mut self) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        let mode = self.simulation.settings.color_mode;
        if let Err(err) = recorder.push_frame(self.simulation.grid(), mode) {
            warn!(%err, "dropping gif recording");
            self.status_message = Some(format!("Recording failed: {}", err));
            self.recorder = None;
        }
    }

    /// Translate a terminal mouse event on `canvas` (inner area) into pointer input
    pub fn handle_mouse(&mut self, event: MouseEvent, canvas: Rect) {
        let x = event.column as i32 - canvas.x as i32;
        let y = event.row as i32 - canvas.y as i32;
        let inside = x >= 0 && y >= 0 && x < canvas.width as i32 && y < canvas.height as i32;
        let (col, row) = braille::canvas_to_cell(
            self.simulation.grid(),
            canvas.width,
            canvas.height,
            x,
            y,
        );

        match event.kind {
            // Presses only count on the canvas, drags may wander off it
            MouseEventKind::Down(button) if inside => {
                self.simulation.pointer_down(col, row, pointer_button(button));
            }
            MouseEventKind::Drag(button) => {
                self.simulation
                    .pointer_move(col, row, Some(pointer_button(button)));
            }
            MouseEventKind::Moved => {
                self.simulation.pointer_move(col, row, None);
            }
            _ => {}
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Gravity => self.simulation.settings.adjust_gravity(0.1),
            Focus::Brush => self.adjust_brush(1),
            Focus::Probability => self.simulation.settings.adjust_spawn_probability(0.05),
            Focus::ColorMode => self.cycle_color_mode(),
            Focus::Speed => self.increase_speed(),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Gravity => self.simulation.settings.adjust_gravity(-0.1),
            Focus::Brush => self.adjust_brush(-1),
            Focus::Probability => self.simulation.settings.adjust_spawn_probability(-0.05),
            Focus::ColorMode => self.cycle_color_mode_prev(),
            Focus::Speed => self.decrease_speed(),
        }
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.simulation.toggle_pause();
    }

    /// Remove all sand
    pub fn clear(&mut self) {
        self.simulation.clear();
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Increase simulation speed
    pub fn increase_speed(&mut self) {
        self.steps_per_frame = (self.steps_per_frame + 1).min(10);
    }

    /// Decrease simulation speed
    pub fn decrease_speed(&mut self) {
        self.steps_per_frame = self.steps_per_frame.saturating_sub(1).max(1);
    }

    /// Grow or shrink the brush by one ring
    pub fn adjust_brush(&mut self, rings: i32) {
        self.simulation.settings.adjust_brush_size(rings);
    }

    /// Cycle through color modes
    pub fn cycle_color_mode(&mut self) {
        self.simulation.settings.color_mode = self.simulation.settings.color_mode.next();
    }

    /// Cycle color mode backward
    pub fn cycle_color_mode_prev(&mut self) {
        self.simulation.settings.color_mode = self.simulation.settings.color_mode.prev();
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Write the current frame to a PNG in the export dir
    pub fn save_snapshot(&mut self) {
        let path = export::timestamped_path(&self.export_dir, "png");
        let mode = self.simulation.settings.color_mode;
        self.status_message = Some(match export::save_png(self.simulation.grid(), mode, &path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(err) => {
                warn!(%err, "snapshot failed");
                format!("Snapshot failed: {}", err)
            }
        });
    }

    /// Start a GIF recording, or finish the running one
    pub fn toggle_recording(&mut self) {
        let message = match self.recorder.take() {
            Some(recorder) => match recorder.finish() {
                Ok(path) => format!("Saved {}", path.display()),
                Err(err) => {
                    warn!(%err, "finishing gif failed");
                    format!("Recording failed: {}", err)
                }
            },
            None => {
                let path = export::timestamped_path(&self.export_dir, "gif");
                match GifRecorder::create(&path, self.simulation.cols(), self.simulation.rows()) {
                    Ok(recorder) => {
                        self.recorder = Some(recorder);
                        format!("Recording {}", path.display())
                    }
                    Err(err) => {
                        warn!(%err, "could not start gif recording");
                        format!("Recording failed: {}", err)
                    }
                }
            }
        };
        self.status_message = Some(message);
    }

    /// Current tunables as an exportable config
    pub fn config(&self) -> AppConfig {
        AppConfig {
            settings: self.simulation.settings.clone(),
            steps_per_frame: self.steps_per_frame,
            ..AppConfig::default()
        }
    }

    /// Save settings to the config file
    pub fn save_config(&mut self) {
        let result = match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => AppConfig::default_path(),
        }
        .and_then(|path| self.config().save_to_file(&path).map(|()| path));

        self.status_message = Some(match result {
            Ok(path) => {
                info!(path = %path.display(), "config saved");
                format!("Config saved to {}", path.display())
            }
            Err(err) => {
                warn!(%err, "config save failed");
                format!("Config save failed: {}", err)
            }
        });
    }

    /// Stop any running recording so the file gets its trailer
    pub fn shutdown(&mut self) {
        if self.recorder.is_some() {
            self.toggle_recording();
        }
    }
}
