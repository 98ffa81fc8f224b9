//! Raster rendering of a `ClassificationView`.
//!
//! Every cell becomes a `cell_size`×`cell_size` square on a black canvas,
//! filled with its category colour except for a `cell_border` wide frame.

use image::Rgb;
use image::RgbImage;
use log::debug;
use thiserror::Error;

use crate::view::ClassificationView;
use crate::view::DisplayOptions;

const BACKGROUND: Rgb<u8> = Rgb([u8::MIN, u8::MIN, u8::MIN]);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Side of each cell, in pixels.
    pub cell_size: u32,
    /// Unfilled margin inside each cell, in pixels.
    pub cell_border: u32,
    pub show_solution: bool,
    pub show_explored: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: 50,
            cell_border: 2,
            show_solution: true,
            show_explored: false,
        }
    }
}

impl RenderConfig {
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            show_solution: self.show_solution,
            show_explored: self.show_explored,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("A {height}x{width} maze with {cell_size}px cells doesn't fit in an image")]
    TooLarge {
        height: usize,
        width: usize,
        cell_size: u32,
    },
    #[error("Image error when saving '{p}': {e}")]
    ImageError {
        p: std::path::PathBuf,
        e: image::ImageError,
    },
}

/// Canvas side for `n` cells.
fn canvas_side(n: usize, cell_size: u32) -> Option<u32> {
    u32::try_from(n).ok()?.checked_mul(cell_size)
}

pub fn render(view: &ClassificationView, config: &RenderConfig) -> Result<RgbImage, RenderError> {
    let (height, width) = view.dimensions();
    let too_large = || RenderError::TooLarge {
        height,
        width,
        cell_size: config.cell_size,
    };
    let img_width = canvas_side(width, config.cell_size).ok_or_else(too_large)?;
    let img_height = canvas_side(height, config.cell_size).ok_or_else(too_large)?;

    let mut img = RgbImage::from_pixel(img_width, img_height, BACKGROUND);

    // Filled span within a cell, inclusive on both ends.
    let first = config.cell_border;
    let last = config
        .cell_size
        .saturating_sub(config.cell_border)
        .min(config.cell_size.saturating_sub(1));
    if config.cell_size == 0 || first > last {
        debug!(
            "Cells of {}px with a {}px border leave no room to fill",
            config.cell_size, config.cell_border
        );
        return Ok(img);
    }

    for (row, categories) in view.rows().enumerate() {
        for (col, category) in categories.iter().enumerate() {
            let fill = Rgb(category.rgb());
            let x0 = col as u32 * config.cell_size;
            let y0 = row as u32 * config.cell_size;
            for y in (y0 + first)..=(y0 + last) {
                for x in (x0 + first)..=(x0 + last) {
                    img.put_pixel(x, y, fill);
                }
            }
        }
    }

    Ok(img)
}

/// Renders and writes the image, the format comes from the extension.
pub fn save(
    view: &ClassificationView,
    config: &RenderConfig,
    p: &std::path::Path,
) -> Result<(), RenderError> {
    let img = render(view, config)?;
    img.save(p).map_err(|e| RenderError::ImageError {
        p: p.to_path_buf(),
        e,
    })?;
    debug!("Saved {}x{} image to {p:?}", img.width(), img.height());

    Ok(())
}
