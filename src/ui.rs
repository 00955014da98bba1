use crate::app::{App, Focus};
use crate::braille;
use crate::color::hue_to_rgb;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 22;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 14;

// UI color scheme
const BORDER_COLOR: Color = Color::Yellow;
const HIGHLIGHT_COLOR: Color = Color::LightYellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Split the frame into sidebar and canvas areas
fn split_frame(area: Rect, fullscreen: bool) -> (Option<Rect>, Rect) {
    if fullscreen {
        return (None, area);
    }
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);
    (Some(layout[0]), layout[1])
}

/// Drawable canvas area (inside its border) for a given frame area.
/// Mouse positions are resolved against this.
pub fn canvas_inner(frame_area: Rect, fullscreen: bool) -> Rect {
    let (_, canvas) = split_frame(frame_area, fullscreen);
    styled_block("").inner(canvas)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let (sidebar, canvas) = split_frame(area, app.fullscreen_mode);

    if let Some(sidebar) = sidebar {
        render_sidebar(frame, sidebar, app);
    }
    render_canvas(frame, canvas, app);

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Status
            Constraint::Length(7), // Parameters
            Constraint::Min(6),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Sand ");
    let sim = &app.simulation;

    let (status_text, status_color) = if app.is_recording() {
        ("● REC", Color::Red)
    } else if sim.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else if sim.moved_last_tick() == 0 {
        ("SETTLED", Color::Green)
    } else {
        ("RUNNING", BORDER_COLOR)
    };

    let mut content = vec![
        Line::from(Span::styled(
            format!("Grains: {}", sim.particle_count()),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!("Tick: {}", sim.tick_count()),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(vec![
            Span::styled(format!("Hue: {} ", sim.hue()), Style::default().fg(TEXT_COLOR)),
            Span::styled("██", Style::default().fg(hue_to_rgb(sim.hue()).into())),
        ]),
        Line::from(Span::styled(status_text, Style::default().fg(status_color))),
    ];
    if let Some(message) = &app.status_message {
        content.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(DIM_TEXT_COLOR),
        )));
    }

    let paragraph = Paragraph::new(content).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.simulation.settings;

    let content = vec![
        make_line(
            "Gravity",
            format!("{:.2}", settings.gravity),
            app.focus == Focus::Gravity,
        ),
        make_line(
            "Brush",
            format!("{}x{}", settings.brush_size, settings.brush_size),
            app.focus == Focus::Brush,
        ),
        make_line(
            "Fill",
            format!("{:.0}%", settings.spawn_probability * 100.0),
            app.focus == Focus::Probability,
        ),
        make_line(
            "Color",
            settings.color_mode.name().to_string(),
            app.focus == Focus::ColorMode,
        ),
        make_line(
            "Speed",
            format!("{}", app.steps_per_frame),
            app.focus == Focus::Speed,
        ),
    ];

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0
    } else if focus_line >= visible_height {
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &str, desc: &str| {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("Mouse", "pour sand"),
        make_control("Space", "pause/resume"),
        make_control(".", "single step"),
        make_control("C", "clear"),
        make_control("M", "color mode"),
        make_control("[/]", "brush size"),
        make_control("+/-", "speed"),
        make_control("Tab", "select param"),
        make_control("P", "save PNG"),
        make_control("G", "record GIF"),
        make_control("S", "save config"),
        make_control("V", "fullscreen"),
        make_control("H", "help"),
        make_control("Q", "quit"),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let is_scrollable = content_height > visible_height;

    let title = if is_scrollable {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let paragraph = Paragraph::new(content)
        .block(styled_block(title))
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = braille::render_to_braille(
        app.simulation.grid(),
        inner.width,
        inner.height,
        app.simulation.settings.color_mode,
    );

    let buffer = frame.buffer_mut();
    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;
        if let Some(target) = buffer.cell_mut((x, y)) {
            target.set_char(cell.char).set_fg(cell.color);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(30);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("FALLING SAND", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Click or drag with the left mouse button to pour grains. Each grain falls, then slides diagonally off whatever it lands on."),
        Line::from(""),
        Line::from(Span::styled("PARAMETERS (Tab, Up/Down):", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from(Span::styled("Gravity", Style::default().fg(TEXT_COLOR))),
        Line::from("Added each tick when choosing the landing row. Only whole units are kept in a grain's speed, so below 1.0 grains fall at a steady row per tick."),
        Line::from(Span::styled("Brush / Fill", Style::default().fg(TEXT_COLOR))),
        Line::from("Square brush size and the chance each cell under it gets a grain."),
        Line::from(Span::styled("Color", Style::default().fg(TEXT_COLOR))),
        Line::from("White, Hue (each stroke gets the next hue), Velocity"),
        Line::from(""),
        Line::from(Span::styled("EXPORT:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("P saves a PNG of the current frame, G starts/stops a GIF recording, S saves the settings as JSON."),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Space=Pause, .=Step, C=Clear, M=Color, [/]=Brush, +/-=Speed, V=Fullscreen, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2);
    let is_scrollable = content_height > visible_height;

    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

/// Lines of the controls box visible for a given terminal height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    // Status (7) + params (7) + controls border (2)
    terminal_height.saturating_sub(16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimulationSettings;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_canvas_inner_excludes_sidebar_and_border() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(canvas_inner(area, false), Rect::new(SIDEBAR_WIDTH + 1, 1, 80 - SIDEBAR_WIDTH - 2, 22));
        assert_eq!(canvas_inner(area, true), Rect::new(1, 1, 78, 22));
    }

    #[test]
    fn test_render_draws_sand() {
        let area = Rect::new(0, 0, 60, 20);
        let canvas = canvas_inner(area, false);
        let mut app = App::new(canvas.width, canvas.height, SimulationSettings::default(), Some(1));
        app.simulation.spawn_at(10, 10);

        let mut terminal = Terminal::new(TestBackend::new(area.width, area.height)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let braille_cells = buffer
            .content()
            .iter()
            .filter(|c| c.symbol().chars().any(|ch| ('\u{2801}'..='\u{28FF}').contains(&ch)))
            .count();
        assert!(braille_cells > 0);
    }
}
