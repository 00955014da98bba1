use crate::grid::Cell;
use crate::settings::ColorMode;

/// Plain RGB triple shared by the terminal and image renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const BLACK: Rgb = Rgb(0, 0, 0);

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.0, c.1, c.2)
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(c: Rgb) -> Self {
        image::Rgb([c.0, c.1, c.2])
    }
}

/// Fully saturated HSV color for a hue in degrees
pub fn hue_to_rgb(hue: u16) -> Rgb {
    let h = (hue % 360) as f32 / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let to_u8 = |v: f32| (v * 255.0).round() as u8;
    Rgb(to_u8(r), to_u8(g), to_u8(b))
}

/// Sand-yellow for resting grains through to red for fast ones
fn velocity_to_rgb(velocity: i32) -> Rgb {
    let t = ((velocity.max(1) - 1) as f32 / 4.0).min(1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Rgb(lerp(230, 255), lerp(200, 60), lerp(120, 30))
}

/// Display color of an occupied cell
pub fn cell_color(cell: Cell, mode: ColorMode) -> Rgb {
    match mode {
        ColorMode::White => WHITE,
        ColorMode::Hue => hue_to_rgb(cell.color_code),
        ColorMode::Velocity => velocity_to_rgb(cell.velocity),
    }
}
