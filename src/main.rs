use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use color_eyre::eyre::WrapErr;

use implot::canvas::Color;
use implot::plotter::{PlotConfig, Plotter};

#[derive(Parser, Debug)]
#[command(name = "implot")]
#[command(about = "Plot implicit relations such as `x^2 + y^2 < 4` with interval arithmetic")]
struct Args {
    /// Relation to plot
    #[arg(short, long)]
    relation: String,

    /// Output image; the format follows the extension (png, bmp, jpg)
    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, default_value_t = 500)]
    width: u32,

    #[arg(long, default_value_t = 500)]
    height: u32,

    #[arg(long, default_value_t = -10.0, allow_negative_numbers = true)]
    xmin: f64,

    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    xmax: f64,

    #[arg(long, default_value_t = -10.0, allow_negative_numbers = true)]
    ymin: f64,

    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    ymax: f64,

    /// Fill color, `#RRGGBB` or `#AARRGGBB`
    #[arg(long, default_value = "#C80078D7")]
    draw_color: Color,

    /// Background color, `#RRGGBB` or `#AARRGGBB`
    #[arg(long, default_value = "#FFFFFFFF")]
    background_color: Color,

    /// Time budget in milliseconds (0 disables it)
    #[arg(long, default_value_t = 10_000)]
    timeout: u64,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let level = match args.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let timeout = (args.timeout > 0).then(|| Duration::from_millis(args.timeout));
    let config = PlotConfig::default()
        .with_size(args.width, args.height)
        .with_x_range(args.xmin, args.xmax)
        .with_y_range(args.ymin, args.ymax)
        .with_timeout(timeout)
        .with_colors(args.draw_color, args.background_color);
    let plotter = Plotter::new(config)?;

    plotter
        .render_to_file(&args.relation, &args.output)
        .wrap_err_with(|| format!("cannot plot `{}` to {}", args.relation, args.output.display()))?;

    Ok(())
}
