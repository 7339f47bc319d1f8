use std::fmt;

use crate::interval::Interval;

/// A pixel-aligned rectangle of the output image and the box of the plane it covers.
///
/// Pixel bounds are inclusive. Rows grow downwards while `y` grows upwards, so `top`
/// corresponds to `y.hi` and `bottom` to `y.lo`.
///
/// # Invariants
///
/// - `left <= right` and `top <= bottom`
/// - `x` and `y` are split in proportion to the pixel counts
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub x: Interval,
    pub y: Interval,
}

impl Region {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32, x: Interval, y: Interval) -> Self {
        debug_assert!(left <= right && top <= bottom, "degenerate region");
        Self {
            left,
            top,
            right,
            bottom,
            x,
            y,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Whether the region is a single pixel.
    pub fn is_minimum(&self) -> bool {
        self.left == self.right && self.top == self.bottom
    }

    /// Halves the region along every axis longer than one pixel.
    ///
    /// Returns four quadrants, two halves for a one-pixel-wide (or tall) strip, and
    /// nothing for a single pixel. The children tile the parent exactly.
    pub fn split(&self) -> Vec<Region> {
        if self.is_minimum() {
            return Vec::new();
        }

        let dx = self.x.width() / self.width() as f64;
        let dy = self.y.width() / self.height() as f64;
        let w = self.left + (self.right - self.left) / 2;
        let h = self.top + (self.bottom - self.top) / 2;
        let x_mid = self.x.lo + (w - self.left + 1) as f64 * dx;
        let y_mid = self.y.lo + (self.bottom - h) as f64 * dy;

        let left_x = Interval::new(self.x.lo, x_mid);
        let right_x = Interval::new(x_mid, self.x.hi);
        let upper_y = Interval::new(y_mid, self.y.hi);
        let lower_y = Interval::new(self.y.lo, y_mid);

        if self.left == self.right {
            vec![
                Region::new(self.left, self.top, self.right, h, self.x, upper_y),
                Region::new(self.left, h + 1, self.right, self.bottom, self.x, lower_y),
            ]
        } else if self.top == self.bottom {
            vec![
                Region::new(self.left, self.top, w, self.bottom, left_x, self.y),
                Region::new(w + 1, self.top, self.right, self.bottom, right_x, self.y),
            ]
        } else {
            vec![
                Region::new(self.left, self.top, w, h, left_x, upper_y),
                Region::new(w + 1, self.top, self.right, h, right_x, upper_y),
                Region::new(self.left, h + 1, w, self.bottom, left_x, lower_y),
                Region::new(w + 1, h + 1, self.right, self.bottom, right_x, lower_y),
            ]
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "px[{}..={}, {}..={}] x={} y={}",
            self.left, self.right, self.top, self.bottom, self.x, self.y
        )
    }
}
