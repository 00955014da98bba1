use crate::color::{cell_color, BLACK};
use crate::error::{Result, SandError};
use crate::grid::{Grid, CELL_PIXELS};
use crate::settings::ColorMode;
use image::{ImageFormat, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pixels per cell in recorded GIF frames (kept small, GIFs grow fast)
const GIF_CELL_PIXELS: usize = 2;

/// Frame delay in hundredths of a second (~60 Hz is not representable)
const GIF_FRAME_DELAY: u16 = 2;

/// Draw the grid like the window renderer: black background, every occupied
/// cell a filled `cell_px` square at `(col * cell_px, row * cell_px)`.
pub fn rasterize(grid: &Grid, mode: ColorMode, cell_px: usize) -> RgbImage {
    let cell_px = cell_px.max(1);
    let width = (grid.cols() * cell_px) as u32;
    let height = (grid.rows() * cell_px) as u32;
    let mut img = RgbImage::from_pixel(width, height, BLACK.into());

    for (col, row, cell) in grid.occupied() {
        let color = cell_color(cell, mode).into();
        let x0 = (col * cell_px) as u32;
        let y0 = (row * cell_px) as u32;
        for dy in 0..cell_px as u32 {
            for dx in 0..cell_px as u32 {
                img.put_pixel(x0 + dx, y0 + dy, color);
            }
        }
    }

    img
}

/// Save the current frame as a PNG
pub fn save_png(grid: &Grid, mode: ColorMode, path: &Path) -> Result<()> {
    rasterize(grid, mode, CELL_PIXELS).save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), "saved snapshot");
    Ok(())
}

/// Timestamped file name inside `dir`, e.g. `sand-1700000000123.png`
pub fn timestamped_path(dir: &Path, extension: &str) -> PathBuf {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    dir.join(format!("sand-{}.{}", millis, extension))
}

/// Appends one GIF frame per simulation tick until finished
pub struct GifRecorder {
    path: PathBuf,
    encoder: gif::Encoder<BufWriter<File>>,
    width: u16,
    height: u16,
    frames: usize,
}

impl GifRecorder {
    /// Start a looping GIF sized for a `cols x rows` grid
    pub fn create(path: &Path, cols: usize, rows: usize) -> Result<Self> {
        let width = (cols * GIF_CELL_PIXELS) as u32;
        let height = (rows * GIF_CELL_PIXELS) as u32;
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(SandError::FrameTooLarge { width, height });
        };

        let file = File::create(path).map_err(|e| SandError::io(path, e))?;
        let mut encoder = gif::Encoder::new(BufWriter::new(file), w, h, &[])?;
        encoder.set_repeat(gif::Repeat::Infinite)?;

        info!(path = %path.display(), width, height, "gif recording started");
        Ok(Self {
            path: path.to_path_buf(),
            encoder,
            width: w,
            height: h,
            frames: 0,
        })
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn push_frame(&mut self, grid: &Grid, mode: ColorMode) -> Result<()> {
        let img = rasterize(grid, mode, GIF_CELL_PIXELS);
        let mut frame = gif::Frame::from_rgb_speed(self.width, self.height, img.as_raw(), 10);
        frame.delay = GIF_FRAME_DELAY;
        self.encoder.write_frame(&frame)?;
        self.frames += 1;
        Ok(())
    }

    /// Write the trailer and close the file
    pub fn finish(self) -> Result<PathBuf> {
        let frames = self.frames;
        let path = self.path;
        self.encoder.into_inner()?;
        info!(path = %path.display(), frames, "gif recording finished");
        Ok(path)
    }
}
