use crate::color::cell_color;
use crate::grid::Grid;
use crate::settings::ColorMode;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dots per character horizontally and vertically
pub const DOTS_X: usize = 2;
pub const DOTS_Y: usize = 4;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Render the sand grid to Braille characters.
///
/// The grid keeps the size it was created with; if the canvas has changed
/// since, dots are scaled onto it.
pub fn render_to_braille(
    grid: &Grid,
    canvas_width: u16,
    canvas_height: u16,
    color_mode: ColorMode,
) -> Vec<BrailleCell> {
    let braille_width = canvas_width as usize * DOTS_X;
    let braille_height = canvas_height as usize * DOTS_Y;
    if braille_width == 0 || braille_height == 0 || grid.cols() == 0 || grid.rows() == 0 {
        return Vec::new();
    }

    // Scale factors (pre-calculated once)
    let scale_x = grid.cols() as f32 / braille_width as f32;
    let scale_y = grid.rows() as f32 / braille_height as f32;

    let mut cells = Vec::new();

    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let mut pattern: u8 = 0;
            let mut color = None;

            let base_bx = cx as usize * DOTS_X;
            let base_by = cy as usize * DOTS_Y;

            for dx in 0..DOTS_X {
                for dy in 0..DOTS_Y {
                    let col = ((base_bx + dx) as f32 * scale_x) as usize;
                    let row = ((base_by + dy) as f32 * scale_y) as usize;
                    if col >= grid.cols() || row >= grid.rows() {
                        continue;
                    }

                    let cell = grid.get(col, row);
                    if !cell.is_empty() {
                        pattern |= BRAILLE_DOTS[dx][dy];
                        color.get_or_insert_with(|| cell_color(cell, color_mode));
                    }
                }
            }

            // Only emit cells that have at least one dot
            if let Some(color) = color {
                let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                cells.push(BrailleCell {
                    x: cx,
                    y: cy,
                    char: braille_char,
                    color: color.into(),
                });
            }
        }
    }

    cells
}

/// Viewport in Braille dots for a canvas measured in characters
pub fn canvas_dots(canvas_width: u16, canvas_height: u16) -> (usize, usize) {
    (canvas_width as usize * DOTS_X, canvas_height as usize * DOTS_Y)
}

/// Map a character position relative to the canvas origin to the grid cell
/// under it, using the same scaling as the renderer. Positions left of or above
/// the canvas map to negative cells.
pub fn canvas_to_cell(
    grid: &Grid,
    canvas_width: u16,
    canvas_height: u16,
    x: i32,
    y: i32,
) -> (isize, isize) {
    let (braille_width, braille_height) = canvas_dots(canvas_width, canvas_height);
    if braille_width == 0 || braille_height == 0 {
        return (-1, -1);
    }
    // Aim at the middle of the character
    let dot_x = x as f32 * DOTS_X as f32 + DOTS_X as f32 / 2.0;
    let dot_y = y as f32 * DOTS_Y as f32 + DOTS_Y as f32 / 2.0;
    let col = (dot_x * grid.cols() as f32 / braille_width as f32).floor() as isize;
    let row = (dot_y * grid.rows() as f32 / braille_height as f32).floor() as isize;
    (col, row)
}
