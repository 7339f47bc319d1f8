//! End-to-end renders checked pixel by pixel against the exact solution sets.

use std::path::Path;

use implot::canvas::{Canvas, CanvasError, Color, RasterCanvas};
use implot::parser::parse;
use implot::plotter::{PlotConfig, PlotStats, Plotter};

const EPS: f64 = 1e-9;

/// Counts how often every pixel was filled.
struct Mask {
    width: u32,
    hits: Vec<u32>,
}

impl Mask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            hits: vec![0; (width * height) as usize],
        }
    }

    fn hits(&self, col: u32, row: u32) -> u32 {
        self.hits[(row * self.width + col) as usize]
    }
}

impl Canvas for Mask {
    fn fill_rect(&mut self, left: u32, top: u32, width: u32, height: u32, _color: Color) {
        for row in top..top + height {
            for col in left..left + width {
                self.hits[(row * self.width + col) as usize] += 1;
            }
        }
    }

    fn save(&self, _path: &Path) -> Result<(), CanvasError> {
        Ok(())
    }
}

fn render(relation: &str, size: u32, range: f64) -> (PlotConfig, Mask, PlotStats) {
    let config = PlotConfig::default()
        .with_size(size, size)
        .with_x_range(-range, range)
        .with_y_range(-range, range)
        .with_timeout(None);
    let plotter = Plotter::new(config.clone()).unwrap();
    let relation = parse(relation).unwrap();
    let mut mask = Mask::new(size, size);
    let stats = plotter.plot(&relation, &mut mask);
    (config, mask, stats)
}

/// The real rectangle `(x_lo, x_hi, y_lo, y_hi)` covered by a pixel.
fn pixel_rect(config: &PlotConfig, col: u32, row: u32) -> (f64, f64, f64, f64) {
    let dx = (config.x_max - config.x_min) / config.width as f64;
    let dy = (config.y_max - config.y_min) / config.height as f64;
    let x_lo = config.x_min + col as f64 * dx;
    let y_hi = config.y_max - row as f64 * dy;
    (x_lo, x_lo + dx, y_hi - dy, y_hi)
}

fn corners((x_lo, x_hi, y_lo, y_hi): (f64, f64, f64, f64)) -> [(f64, f64); 4] {
    [(x_lo, y_lo), (x_lo, y_hi), (x_hi, y_lo), (x_hi, y_hi)]
}

/// Squared distance from the origin to the closest point of the rectangle.
fn min_dist2((x_lo, x_hi, y_lo, y_hi): (f64, f64, f64, f64)) -> f64 {
    let nearest = |lo: f64, hi: f64| if lo > 0.0 { lo } else if hi < 0.0 { hi } else { 0.0 };
    let x = nearest(x_lo, x_hi);
    let y = nearest(y_lo, y_hi);
    x * x + y * y
}

fn max_dist2(rect: (f64, f64, f64, f64)) -> f64 {
    corners(rect).iter().map(|(x, y)| x * x + y * y).fold(0.0, f64::max)
}

fn assert_each_pixel_once(mask: &Mask, stats: &PlotStats) {
    assert!(mask.hits.iter().all(|&h| h <= 1), "a pixel was filled twice");
    let filled = mask.hits.iter().filter(|&&h| h == 1).count() as u64;
    assert_eq!(filled, stats.pixels_filled);
}

#[test]
fn test_disc() {
    let (config, mask, stats) = render("x^2 + y^2 < 4", 100, 3.0);
    assert!(!stats.timed_out);
    assert_each_pixel_once(&mask, &stats);

    for row in 0..config.height {
        for col in 0..config.width {
            let rect = pixel_rect(&config, col, row);
            let (cx, cy) = ((rect.0 + rect.1) / 2.0, (rect.2 + rect.3) / 2.0);
            if (cx * cx + cy * cy).sqrt() < 2.0 - EPS {
                assert_eq!(mask.hits(col, row), 1, "pixel ({}, {}) inside the disc is empty", col, row);
            }
            if min_dist2(rect) > 4.0 + EPS {
                assert_eq!(mask.hits(col, row), 0, "pixel ({}, {}) outside the disc is filled", col, row);
            }
        }
    }
}

#[test]
fn test_circle() {
    let (config, mask, stats) = render("x^2 + y^2 = 4", 100, 3.0);
    assert!(!stats.timed_out);
    assert_each_pixel_once(&mask, &stats);

    let mut straddling = 0;
    for row in 0..config.height {
        for col in 0..config.width {
            let rect = pixel_rect(&config, col, row);
            let values = corners(rect).map(|(x, y)| x * x + y * y - 4.0);
            if values.iter().any(|&v| v < -EPS) && values.iter().any(|&v| v > EPS) {
                straddling += 1;
                assert_eq!(mask.hits(col, row), 1, "pixel ({}, {}) crossing the circle is empty", col, row);
            }
            if max_dist2(rect) < 4.0 - EPS || min_dist2(rect) > 4.0 + EPS {
                assert_eq!(mask.hits(col, row), 0, "pixel ({}, {}) off the circle is filled", col, row);
            }
        }
    }
    assert!(straddling > 0);
}

#[test]
fn test_hyperbola_asymptote_terminates() {
    // With an odd width, the middle column straddles x = 0.
    let (config, mask, stats) = render("y = 1/x", 101, 3.0);
    assert!(!stats.timed_out);
    assert_each_pixel_once(&mask, &stats);
    assert_eq!(stats.pixel_tasks, stats.tasks_true + stats.tasks_false + stats.tasks_capped);

    let middle = config.width / 2;
    let (x_lo, x_hi, _, _) = pixel_rect(&config, middle, 0);
    assert!(x_lo < 0.0 && x_hi > 0.0);
    for row in 0..config.height {
        assert_eq!(mask.hits(middle, row), 0, "asymptote pixel at row {} is filled", row);
    }

    // Far from the asymptote the curve is drawn.
    assert!(stats.pixels_filled > 0);
}

#[test]
fn test_undefined_region_stays_empty() {
    // sqrt(x) is undefined for x < 0, so nothing left of the axis satisfies the relation.
    let (config, mask, stats) = render("sqrt(x) >= 0", 40, 2.0);
    assert_each_pixel_once(&mask, &stats);
    for row in 0..config.height {
        for col in 0..config.width {
            let (_, x_hi, _, _) = pixel_rect(&config, col, row);
            if x_hi < -EPS {
                assert_eq!(mask.hits(col, row), 0);
            }
        }
    }
    assert!(stats.pixels_filled >= 20 * 40);
}

#[test]
fn test_save_png() {
    let config = PlotConfig::default()
        .with_size(32, 24)
        .with_x_range(-1.0, 1.0)
        .with_y_range(-1.0, 1.0)
        .with_colors(Color::BLACK, Color::WHITE);
    let plotter = Plotter::new(config).unwrap();
    let relation = parse("y > 0").unwrap();
    let mut canvas: RasterCanvas = plotter.new_canvas();
    plotter.plot(&relation, &mut canvas);

    let path = std::env::temp_dir().join(format!("implot-test-{}.png", std::process::id()));
    canvas.save(&path).unwrap();
    let image = image::open(&path).unwrap().to_rgba8();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(image.dimensions(), (32, 24));
    // Upper half is y > 0.
    assert_eq!(image.get_pixel(5, 2).0, [0, 0, 0, 255]);
    assert_eq!(image.get_pixel(5, 20).0, [255, 255, 255, 255]);
}

#[test]
fn test_unknown_extension() {
    let canvas = RasterCanvas::new(2, 2, Color::WHITE);
    let path = std::env::temp_dir().join("implot-test.unknown-format");
    assert!(matches!(canvas.save(&path), Err(CanvasError::Image(_))));
}
