mod app;
mod braille;
mod brush;
mod color;
mod config;
mod error;
mod export;
mod grid;
mod physics;
mod settings;
mod simulation;
mod ui;

use app::{App, Focus};
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use settings::{ColorMode, SimulationSettings};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sand-simulation")]
#[command(about = "Falling-sand cellular automaton in the terminal")]
struct Args {
    /// Gravity added per tick (0.0-2.0)
    #[arg(short = 'g', long)]
    gravity: Option<f64>,

    /// Brush side length in cells (odd, 1-15)
    #[arg(short = 'b', long)]
    brush: Option<usize>,

    /// Chance each cell under the brush gets a grain (0.05-1.0)
    #[arg(short = 'p', long)]
    probability: Option<f64>,

    /// Hue of the first stroke (1-360)
    #[arg(long)]
    hue: Option<u16>,

    /// Braille dots per cell side (1-8)
    #[arg(long = "cell-size")]
    cell_size: Option<usize>,

    /// Color mode (white, hue, velocity)
    #[arg(long = "color-mode")]
    color_mode: Option<String>,

    /// Simulation steps per tick (1-10)
    #[arg(long)]
    speed: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Settings file to load and save (JSON). Defaults to the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file (level from RUST_LOG, default info)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Directory for PNG snapshots and GIF recordings
    #[arg(long = "export-dir", default_value = ".")]
    export_dir: PathBuf,
}

fn parse_color_mode(s: &str) -> ColorMode {
    match s.to_lowercase().as_str() {
        "hue" | "color" | "rainbow" => ColorMode::Hue,
        "velocity" | "speed" | "vel" => ColorMode::Velocity,
        _ => ColorMode::White,
    }
}

/// The terminal UI owns stdout, so logs only go to a file when asked for
fn init_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    Ok(())
}

/// An explicit `--config` that exists must parse; a missing one means defaults.
/// The default location is best-effort.
fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        if path.exists() {
            info!(path = %path.display(), "loading config");
            return Ok(AppConfig::load_from_file(path)?);
        }
        info!(path = %path.display(), "config file missing, using defaults");
        return Ok(AppConfig::default());
    }

    match AppConfig::default_path() {
        Ok(path) if path.exists() => match AppConfig::load_from_file(&path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(err) => {
                warn!(%err, "ignoring unreadable config");
                Ok(AppConfig::default())
            }
        },
        _ => Ok(AppConfig::default()),
    }
}

/// Config first, then any flags given on the command line
fn build_settings(args: &Args, config: &AppConfig) -> SimulationSettings {
    let mut settings = config.settings.clone();
    if let Some(gravity) = args.gravity {
        settings.gravity = gravity;
    }
    if let Some(brush) = args.brush {
        settings.brush_size = brush;
    }
    if let Some(probability) = args.probability {
        settings.spawn_probability = probability;
    }
    if let Some(hue) = args.hue {
        settings.initial_hue = hue;
    }
    if let Some(cell_size) = args.cell_size {
        settings.cell_size = cell_size;
    }
    if let Some(mode) = &args.color_mode {
        settings.color_mode = parse_color_mode(mode);
    }
    settings.sanitize();
    settings
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = load_config(args.config.as_deref())?;
    let settings = build_settings(&args, &config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // The grid is sized once from the initial canvas
    let size = terminal.size()?;
    let canvas = ui::canvas_inner(Rect::new(0, 0, size.width, size.height), false);
    let mut app = App::new(canvas.width, canvas.height, settings, args.seed);
    app.steps_per_frame = args.speed.unwrap_or(config.steps_per_frame).clamp(1, 10);
    app.export_dir = args.export_dir.clone();
    app.config_path = args.config.clone();

    // Run the app
    let res = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!(
        ticks = app.simulation.tick_count(),
        grains = app.simulation.particle_count(),
        "exiting"
    );

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Target ~60 ticks per second; late ticks are not caught up
    const TICK_DURATION: Duration = Duration::from_millis(16);
    let mut next_tick = Instant::now() + TICK_DURATION;

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    match key.code {
                        // System controls
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') => app.toggle_pause(),
                        KeyCode::Char('.') => app.step_once(),
                        KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.clear()
                        }
                        KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
                        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                        KeyCode::Char('p') | KeyCode::Char('P') => app.save_snapshot(),
                        KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_recording(),
                        KeyCode::Char('s') | KeyCode::Char('S') => app.save_config(),
                        KeyCode::Char('m') | KeyCode::Char('M') => {
                            app.cycle_color_mode();
                            app.focus = Focus::ColorMode;
                        }
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            app.increase_speed();
                            app.focus = Focus::Speed;
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            app.decrease_speed();
                            app.focus = Focus::Speed;
                        }
                        KeyCode::Char('[') => {
                            app.adjust_brush(-1);
                            app.focus = Focus::Brush;
                        }
                        KeyCode::Char(']') => {
                            app.adjust_brush(1);
                            app.focus = Focus::Brush;
                        }

                        // Navigation
                        KeyCode::Tab => app.next_focus(),
                        KeyCode::BackTab => app.prev_focus(),
                        KeyCode::Up => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_up();
                                } else {
                                    app.scroll_controls_up();
                                }
                            }
                        }
                        KeyCode::Down => {
                            if !app.show_help {
                                if app.focus.is_param() {
                                    app.adjust_focused_down();
                                } else {
                                    let term_size = terminal.size().unwrap_or_default();
                                    let visible = ui::get_controls_visible_lines(term_size.height);
                                    app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                                }
                            }
                        }
                        KeyCode::Esc => {
                            if app.show_help {
                                app.toggle_help();
                            } else if app.focus.is_param() {
                                app.focus = Focus::Controls;
                            }
                        }
                        KeyCode::Char('j') | KeyCode::Char('J') => {
                            if app.show_help {
                                app.scroll_help_down(ui::HELP_CONTENT_LINES);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Char('K') => {
                            if app.show_help {
                                app.scroll_help_up();
                            }
                        }
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let canvas = ui::canvas_inner(
                        Rect::new(0, 0, size.width, size.height),
                        app.fullscreen_mode,
                    );
                    app.handle_mouse(mouse, canvas);
                }
                Event::Resize(width, height) => {
                    // Grid size is fixed; the renderer rescales
                    debug!(width, height, "terminal resized");
                }
                _ => {}
            }
        }

        let now = Instant::now();
        if now >= next_tick {
            app.tick();
            next_tick = now + TICK_DURATION;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "sand-simulation",
            "--gravity",
            "0.5",
            "--brush",
            "4",
            "--color-mode",
            "hue",
        ]);
        let mut config = AppConfig::default();
        config.settings.spawn_probability = 0.3;

        let settings = build_settings(&args, &config);
        assert_eq!(settings.gravity, 0.5);
        assert_eq!(settings.brush_size, 5);
        assert_eq!(settings.spawn_probability, 0.3);
        assert_eq!(settings.color_mode, ColorMode::Hue);
    }

    #[test]
    fn test_parse_color_mode() {
        assert_eq!(parse_color_mode("Velocity"), ColorMode::Velocity);
        assert_eq!(parse_color_mode("rainbow"), ColorMode::Hue);
        assert_eq!(parse_color_mode("anything"), ColorMode::White);
    }

    #[test]
    fn test_explicit_missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path().join("absent.json").as_path())).unwrap();
        assert_eq!(config.steps_per_frame, 1);
    }

    #[test]
    fn test_init_logging_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sand.log");
        // Another test may already own the global subscriber
        let _ = init_logging(&path);
        assert!(path.exists());
    }
}
