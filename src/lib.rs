//! # implot: Implicit relation plotting with interval arithmetic
//!
//! **`implot`** renders the solution set of a relation `f(x, y) ⋈ g(x, y)`, with
//! `⋈ ∈ {<, <=, >, >=, =}`, over a rectangle of the plane into a raster image.
//!
//! ## Why intervals?
//!
//! Sampling one point per pixel cannot tell "true everywhere in this pixel" from "false
//! everywhere" from "somewhere in between". Instead, every expression is evaluated over
//! a whole box of the plane with **interval extensions**: the result is guaranteed to
//! contain every value the expression takes on that box. Comparing two such bounds yields
//! a three-valued [`Verdict`][crate::verdict::Verdict]:
//!
//! - `True`: every point of the box satisfies the relation, so the block is filled;
//! - `False`: no point does, so the block is skipped;
//! - `Maybe`: the bounds overlap, so the box is subdivided.
//!
//! Intervals also carry **definedness** and **continuity** flags, so that `sqrt` of a
//! partly negative range, a division by a range straddling zero, or the jump of `floor`
//! can never produce a false `True`.
//!
//! ## Basic Usage
//!
//! ```rust
//! use implot::canvas::RasterCanvas;
//! use implot::parser::parse;
//! use implot::plotter::{PlotConfig, Plotter};
//!
//! // 1. Parse the relation
//! let relation = parse("x^2 + y^2 < 4").unwrap();
//!
//! // 2. Configure the plot
//! let config = PlotConfig::default()
//!     .with_size(64, 64)
//!     .with_x_range(-3.0, 3.0)
//!     .with_y_range(-3.0, 3.0);
//! let plotter = Plotter::new(config).unwrap();
//!
//! // 3. Render into an in-memory image
//! let mut canvas: RasterCanvas = plotter.new_canvas();
//! let stats = plotter.plot(&relation, &mut canvas);
//!
//! // The center of the disc is filled, the corners are not
//! assert!(stats.pixels_filled > 0);
//! assert_ne!(canvas.pixel(32, 32), plotter.config().background_color);
//! assert_eq!(canvas.pixel(0, 0), plotter.config().background_color);
//! ```
//!
//! ## Core Components
//!
//! - **[`interval`]** and **[`interval_set`]**: the arithmetic core.
//! - **[`expr`]** and **[`simplify`]**: expression trees, their evaluation and rewriting.
//! - **[`relation`]**: three-valued classification of boxes.
//! - **[`plotter`]**: the adaptive subdivision renderer.
//! - **[`parser`]** and **[`canvas`]**: textual input and raster output.

pub mod canvas;
pub mod expr;
pub mod interval;
pub mod interval_set;
pub mod math;
pub mod parser;
pub mod plotter;
pub mod region;
pub mod relation;
pub mod simplify;
pub mod verdict;
