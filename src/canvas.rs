//! Output sinks for the plotter.
//!
//! The plotter only ever calls [`Canvas::fill_rect`], once per resolved region or
//! pixel, and never fills the same pixel twice. Colors are opaque to it: they are
//! handed through from the configuration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("invalid color `{0}`: expected #RRGGBB or #AARRGGBB")]
    InvalidColor(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// An RGBA color with 8 bits per channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Source-over compositing of `self` onto `dst`.
    pub fn over(self, dst: Color) -> Color {
        let sa = self.a as u32;
        let da = dst.a as u32 * (255 - sa) / 255;
        let out_a = sa + da;
        if out_a == 0 {
            return Color::rgba(0, 0, 0, 0);
        }
        let blend = |s: u8, d: u8| ((s as u32 * sa + d as u32 * da + out_a / 2) / out_a) as u8;
        Color::rgba(
            blend(self.r, dst.r),
            blend(self.g, dst.g),
            blend(self.b, dst.b),
            out_a as u8,
        )
    }
}

impl FromStr for Color {
    type Err = CanvasError;

    /// Parses `#RRGGBB` or `#AARRGGBB` (alpha first).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CanvasError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        Rgba([c.r, c.g, c.b, c.a])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(Rgba([r, g, b, a]): Rgba<u8>) -> Self {
        Color::rgba(r, g, b, a)
    }
}

/// A raster the plotter draws into.
pub trait Canvas {
    /// Paints the pixel block with top-left corner `(left, top)`.
    fn fill_rect(&mut self, left: u32, top: u32, width: u32, height: u32, color: Color);

    /// Writes the canvas to `path`.
    fn save(&self, path: &Path) -> Result<(), CanvasError>;
}

/// An in-memory RGBA image backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    /// Creates a canvas cleared to `background`.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, background.into()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        (*self.image.get_pixel(x, y)).into()
    }
}

impl Canvas for RasterCanvas {
    fn fill_rect(&mut self, left: u32, top: u32, width: u32, height: u32, color: Color) {
        let right = (left + width).min(self.image.width());
        let bottom = (top + height).min(self.image.height());
        for y in top..bottom {
            for x in left..right {
                let dst = self.pixel(x, y);
                self.image.put_pixel(x, y, color.over(dst).into());
            }
        }
    }

    /// Encodes by file extension. Formats without alpha get the alpha channel dropped.
    fn save(&self, path: &Path) -> Result<(), CanvasError> {
        let format = ImageFormat::from_path(path)?;
        debug!("saving {}x{} image as {:?} to {}", self.width(), self.height(), format, path.display());
        let image = DynamicImage::ImageRgba8(self.image.clone());
        match format {
            ImageFormat::Jpeg | ImageFormat::Bmp => image.to_rgb8().save_with_format(path, format)?,
            _ => image.save_with_format(path, format)?,
        }
        Ok(())
    }
}
