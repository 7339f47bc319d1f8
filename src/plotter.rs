//! Adaptive subdivision renderer.
//!
//! Rendering runs in two phases over explicit work queues:
//!
//! 1. **Coarse subdivision.** Starting from the whole image, every region is
//!    classified with [`Relation::eval`]. `True` regions are filled, `False` regions
//!    are dropped, `Maybe` regions are split and re-queued. Single pixels are
//!    classified with [`Relation::eval_in_pixel`] and, if still ambiguous, become
//!    refinement tasks.
//! 2. **Pixel refinement.** Each task keeps a queue of sub-blocks of its pixel. One
//!    pass quarters every queued block and classifies the pieces. Any `True` piece
//!    fills the pixel, `False` pieces are dropped. A task that is still ambiguous
//!    after `max_splits` passes resolves to `False`.
//!
//! Every pixel is filled at most once. A deadline, if configured, is checked at each
//! queue pop; pending work is abandoned when it expires.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::canvas::{Canvas, CanvasError, Color, RasterCanvas};
use crate::interval::Interval;
use crate::parser::{parse, ParseError};
use crate::region::Region;
use crate::relation::Relation;
use crate::verdict::Verdict;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Wall-clock budget for a single render. `None` renders to completion.
    pub timeout: Option<Duration>,
    /// Number of refinement passes after which an ambiguous pixel is dropped.
    pub max_splits: u32,
    pub draw_color: Color,
    pub background_color: Color,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            x_min: -10.0,
            x_max: 10.0,
            y_min: -10.0,
            y_max: 10.0,
            timeout: Some(Duration::from_secs(10)),
            max_splits: 10,
            draw_color: Color::rgba(0x00, 0x78, 0xD7, 0xC8),
            background_color: Color::WHITE,
        }
    }
}

impl PlotConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_x_range(mut self, min: f64, max: f64) -> Self {
        self.x_min = min;
        self.x_max = max;
        self
    }

    pub fn with_y_range(mut self, min: f64, max: f64) -> Self {
        self.y_min = min;
        self.y_max = max;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_splits(mut self, max_splits: u32) -> Self {
        self.max_splits = max_splits;
        self
    }

    pub fn with_colors(mut self, draw: Color, background: Color) -> Self {
        self.draw_color = draw;
        self.background_color = background;
        self
    }

    pub fn validate(&self) -> Result<(), PlotError> {
        if self.width == 0 || self.height == 0 {
            return Err(PlotError::InvalidConfig(format!(
                "image size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        let range_ok = |lo: f64, hi: f64| lo.is_finite() && hi.is_finite() && lo < hi;
        if !range_ok(self.x_min, self.x_max) {
            return Err(PlotError::InvalidConfig(format!(
                "x range [{}, {}] is empty or not finite",
                self.x_min, self.x_max
            )));
        }
        if !range_ok(self.y_min, self.y_max) {
            return Err(PlotError::InvalidConfig(format!(
                "y range [{}, {}] is empty or not finite",
                self.y_min, self.y_max
            )));
        }
        if self.max_splits == 0 {
            return Err(PlotError::InvalidConfig("max_splits must be positive".to_string()));
        }
        Ok(())
    }
}

/// Counters collected during a render.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct PlotStats {
    pub regions_evaluated: u64,
    pub regions_filled: u64,
    pub pixels_filled: u64,
    pub pixel_tasks: u64,
    pub tasks_true: u64,
    pub tasks_false: u64,
    pub tasks_capped: u64,
    pub timed_out: bool,
}

impl fmt::Display for PlotStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} regions evaluated, {} regions filled, {} pixels filled, {} pixel tasks ({} true, {} false, {} capped)",
            self.regions_evaluated,
            self.regions_filled,
            self.pixels_filled,
            self.pixel_tasks,
            self.tasks_true,
            self.tasks_false,
            self.tasks_capped,
        )?;
        if self.timed_out {
            write!(f, ", timed out")?;
        }
        Ok(())
    }
}

/// Refinement state of a single ambiguous pixel.
#[derive(Debug)]
struct PixelTask {
    left: u32,
    top: u32,
    blocks: VecDeque<(Interval, Interval)>,
    splits: u32,
}

impl PixelTask {
    fn new(region: &Region) -> Self {
        Self {
            left: region.left,
            top: region.top,
            blocks: VecDeque::from([(region.x, region.y)]),
            splits: 0,
        }
    }

    /// Runs one refinement pass over every currently queued block.
    ///
    /// Returns `True` as soon as a sub-block is proven, `False` when nothing ambiguous
    /// remains, and `Maybe` otherwise.
    fn refine(&mut self, relation: &Relation) -> Verdict {
        for _ in 0..self.blocks.len() {
            let Some((x, y)) = self.blocks.pop_front() else {
                break;
            };
            for (bx, by) in quarter(x, y) {
                match relation.eval_in_pixel(bx, by) {
                    Verdict::True => return Verdict::True,
                    Verdict::Maybe => self.blocks.push_back((bx, by)),
                    Verdict::False => {}
                }
            }
        }
        if self.blocks.is_empty() {
            Verdict::False
        } else {
            Verdict::Maybe
        }
    }
}

fn quarter(x: Interval, y: Interval) -> [(Interval, Interval); 4] {
    let xm = x.mid();
    let ym = y.mid();
    [
        (Interval::new(x.lo, xm), Interval::new(y.lo, ym)),
        (Interval::new(x.lo, xm), Interval::new(ym, y.hi)),
        (Interval::new(xm, x.hi), Interval::new(y.lo, ym)),
        (Interval::new(xm, x.hi), Interval::new(ym, y.hi)),
    ]
}

#[derive(Debug, Clone)]
pub struct Plotter {
    config: PlotConfig,
}

impl Plotter {
    pub fn new(config: PlotConfig) -> Result<Self, PlotError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// A raster of the configured size cleared to the background color.
    pub fn new_canvas(&self) -> RasterCanvas {
        RasterCanvas::new(self.config.width, self.config.height, self.config.background_color)
    }

    /// The region covering the whole image.
    pub fn image_region(&self) -> Region {
        let c = &self.config;
        Region::new(
            0,
            0,
            c.width - 1,
            c.height - 1,
            Interval::new(c.x_min, c.x_max),
            Interval::new(c.y_min, c.y_max),
        )
    }

    /// Renders `relation` into `canvas`, filling every pixel proven to contain a
    /// solution with the draw color. The canvas is expected to already hold the
    /// background.
    pub fn plot<C: Canvas + ?Sized>(&self, relation: &Relation, canvas: &mut C) -> PlotStats {
        let started = Instant::now();
        // A timeout too large to represent as an instant never expires.
        let deadline = self.config.timeout.and_then(|t| started.checked_add(t));
        let expired = || deadline.is_some_and(|d| Instant::now() >= d);
        let color = self.config.draw_color;
        let mut stats = PlotStats::default();

        debug!("plotting {} over {}", relation, self.image_region());

        let mut regions = VecDeque::from([self.image_region()]);
        let mut tasks = VecDeque::new();

        while let Some(region) = regions.pop_front() {
            if expired() {
                stats.timed_out = true;
                break;
            }
            stats.regions_evaluated += 1;

            if region.is_minimum() {
                let verdict = relation.eval_in_pixel(region.x, region.y);
                trace!("{} => {} (pixel)", region, verdict);
                match verdict {
                    Verdict::True => {
                        canvas.fill_rect(region.left, region.top, 1, 1, color);
                        stats.pixels_filled += 1;
                    }
                    Verdict::Maybe => tasks.push_back(PixelTask::new(&region)),
                    Verdict::False => {}
                }
            } else {
                let verdict = relation.eval(region.x, region.y);
                trace!("{} => {}", region, verdict);
                match verdict {
                    Verdict::True => {
                        canvas.fill_rect(region.left, region.top, region.width(), region.height(), color);
                        stats.regions_filled += 1;
                        stats.pixels_filled += region.pixel_count();
                    }
                    Verdict::Maybe => regions.extend(region.split()),
                    Verdict::False => {}
                }
            }
        }

        stats.pixel_tasks = tasks.len() as u64;
        if !stats.timed_out {
            debug!("coarse phase done in {:?}, refining {} pixels", started.elapsed(), tasks.len());
        }

        while !stats.timed_out {
            let Some(mut task) = tasks.pop_front() else {
                break;
            };
            if expired() {
                stats.timed_out = true;
                break;
            }
            match task.refine(relation) {
                Verdict::True => {
                    canvas.fill_rect(task.left, task.top, 1, 1, color);
                    stats.pixels_filled += 1;
                    stats.tasks_true += 1;
                }
                Verdict::False => stats.tasks_false += 1,
                Verdict::Maybe => {
                    task.splits += 1;
                    if task.splits >= self.config.max_splits {
                        trace!("pixel ({}, {}) capped after {} splits", task.left, task.top, task.splits);
                        stats.tasks_capped += 1;
                    } else {
                        tasks.push_back(task);
                    }
                }
            }
        }

        if stats.timed_out {
            warn!(
                "timed out after {:?}: abandoned {} regions and {} pixel tasks",
                started.elapsed(),
                regions.len(),
                tasks.len()
            );
        }
        info!("rendered in {:?}: {}", started.elapsed(), stats);
        stats
    }

    /// Parses `text`, renders it onto a fresh canvas and saves the image to `path`.
    ///
    /// The image is saved even when the run times out.
    pub fn render_to_file(&self, text: &str, path: &Path) -> Result<PlotStats, PlotError> {
        let relation = parse(text)?;
        info!("relation: {}", relation);

        let mut canvas = self.new_canvas();
        let stats = self.plot(&relation, &mut canvas);
        if stats.timed_out {
            info!("saving partial image");
        }
        canvas.save(path)?;
        info!("wrote {}", path.display());
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use test_log::test;

    use super::*;
    use crate::expr::ExprBoxed;
    use crate::relation::Comparator;

    /// Records every filled pixel.
    #[derive(Default)]
    struct Recorder {
        filled: Vec<(u32, u32)>,
    }

    impl Canvas for Recorder {
        fn fill_rect(&mut self, left: u32, top: u32, width: u32, height: u32, _color: Color) {
            for y in top..top + height {
                for x in left..left + width {
                    self.filled.push((x, y));
                }
            }
        }

        fn save(&self, _path: &Path) -> Result<(), CanvasError> {
            Ok(())
        }
    }

    fn config(size: u32) -> PlotConfig {
        PlotConfig::default()
            .with_size(size, size)
            .with_x_range(-3.0, 3.0)
            .with_y_range(-3.0, 3.0)
            .with_timeout(None)
    }

    #[test]
    fn test_default_config() {
        let c = PlotConfig::default();
        assert_eq!((c.width, c.height), (500, 500));
        assert_eq!(c.timeout, Some(Duration::from_secs(10)));
        assert_eq!(c.max_splits, 10);
        assert_eq!(c.draw_color, "#C80078D7".parse::<Color>().unwrap());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(Plotter::new(PlotConfig::default().with_size(0, 10)).is_err());
        assert!(Plotter::new(PlotConfig::default().with_x_range(1.0, 1.0)).is_err());
        assert!(Plotter::new(PlotConfig::default().with_y_range(0.0, f64::NAN)).is_err());
        assert!(Plotter::new(PlotConfig::default().with_max_splits(0)).is_err());
    }

    #[test]
    fn test_constant_true_fills_everything_at_once() {
        let relation = Relation::new(&ExprBoxed::Const(0.0), Comparator::Lt, &ExprBoxed::Const(1.0));
        let plotter = Plotter::new(config(16)).unwrap();
        let mut canvas = Recorder::default();
        let stats = plotter.plot(&relation, &mut canvas);
        assert_eq!(stats.regions_evaluated, 1);
        assert_eq!(stats.regions_filled, 1);
        assert_eq!(canvas.filled.len(), 256);
    }

    #[test]
    fn test_constant_false_fills_nothing() {
        let relation = Relation::new(&ExprBoxed::Const(2.0), Comparator::Lt, &ExprBoxed::Const(1.0));
        let plotter = Plotter::new(config(16)).unwrap();
        let mut canvas = Recorder::default();
        let stats = plotter.plot(&relation, &mut canvas);
        assert_eq!(stats.regions_evaluated, 1);
        assert!(canvas.filled.is_empty());
    }

    #[test]
    fn test_half_plane_no_pixel_twice() {
        // x < 0.1: the boundary cuts through a column of pixels.
        let relation = Relation::new(&ExprBoxed::X, Comparator::Lt, &ExprBoxed::Const(0.1));
        let plotter = Plotter::new(config(20)).unwrap();
        let mut canvas = Recorder::default();
        let stats = plotter.plot(&relation, &mut canvas);

        let unique: HashSet<_> = canvas.filled.iter().copied().collect();
        assert_eq!(unique.len(), canvas.filled.len());
        assert_eq!(stats.pixels_filled, canvas.filled.len() as u64);
        // Columns 0..=10 touch x < 0.1; column 11 starts at 0.3.
        for &(x, _) in &unique {
            assert!(x <= 10);
        }
        assert_eq!(unique.len(), 11 * 20);
    }

    #[test]
    fn test_zero_timeout_abandons_work() {
        let relation = Relation::new(&ExprBoxed::X, Comparator::Lt, &ExprBoxed::Y);
        let plotter = Plotter::new(config(8).with_timeout(Some(Duration::ZERO))).unwrap();
        let mut canvas = Recorder::default();
        let stats = plotter.plot(&relation, &mut canvas);
        assert!(stats.timed_out);
        assert!(canvas.filled.is_empty());
    }

    #[test]
    fn test_huge_timeout_never_expires() {
        let relation = Relation::new(&ExprBoxed::X, Comparator::Lt, &ExprBoxed::Y);
        let plotter = Plotter::new(config(4).with_timeout(Some(Duration::MAX))).unwrap();
        let mut canvas = Recorder::default();
        let stats = plotter.plot(&relation, &mut canvas);
        assert!(!stats.timed_out);
        assert!(stats.pixels_filled > 0);
    }

    #[test]
    fn test_render_to_file() {
        let plotter = Plotter::new(config(8)).unwrap();
        let path = std::env::temp_dir().join(format!("implot-plotter-{}.png", std::process::id()));
        let stats = plotter.render_to_file("y > 0", &path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
        assert_eq!(stats.pixels_filled, 32);
    }

    #[test]
    fn test_render_to_file_errors() {
        let plotter = Plotter::new(config(8)).unwrap();
        let png = std::env::temp_dir().join("implot-plotter-unused.png");
        assert!(matches!(
            plotter.render_to_file("x <", &png),
            Err(PlotError::Parse(ParseError::UnexpectedEnd))
        ));
        assert!(!png.exists());

        let unknown = std::env::temp_dir().join("implot-plotter.unknown-format");
        assert!(matches!(
            plotter.render_to_file("x < y", &unknown),
            Err(PlotError::Canvas(CanvasError::Image(_)))
        ));
    }

    #[test]
    fn test_refine_caps_splits() {
        // Every refinement task ends in exactly one of the three outcomes.
        let lhs = ExprBoxed::X;
        let rhs = ExprBoxed::add(
            ExprBoxed::pow(ExprBoxed::Y, ExprBoxed::Const(2.0)),
            ExprBoxed::div(ExprBoxed::Const(1.0), ExprBoxed::Const(3.0)),
        );
        let relation = Relation::new(&lhs, Comparator::Eq, &rhs);
        let plotter = Plotter::new(config(16).with_max_splits(2)).unwrap();
        let mut canvas = Recorder::default();
        let stats = plotter.plot(&relation, &mut canvas);
        assert_eq!(
            stats.pixel_tasks,
            stats.tasks_true + stats.tasks_false + stats.tasks_capped
        );
        assert!(stats.pixels_filled > 0);
    }

    #[test]
    fn test_quarter_tiles_block() {
        let parts = quarter(Interval::new(0.0, 2.0), Interval::new(-1.0, 1.0));
        let area: f64 = parts.iter().map(|(x, y)| x.width() * y.width()).sum();
        assert_eq!(area, 4.0);
        assert!(parts.contains(&(Interval::new(1.0, 2.0), Interval::new(0.0, 1.0))));
    }
}
