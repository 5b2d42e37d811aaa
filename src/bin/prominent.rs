use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::imageops::FilterType;
use prominent_colors_wasm::extract::MAX_SAMPLE_SIZE;
use prominent_colors_wasm::{DEFAULT_COLOR_COUNT, ExtractOptions, ImageSource, NativeDecoder, SAMPLE_SIZE, extract};
use serde_json::json;

/// Print the most prominent colors of images (native wrapper around the WASM library).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Image paths, file:// URLs or base64 data URIs
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Maximum number of colors per image
    #[arg(short = 'n', long, default_value_t = DEFAULT_COLOR_COUNT as i64, allow_negative_numbers = true)]
    count: i64,

    /// Side of the square raster images are sampled at
    #[arg(
        short,
        long,
        default_value_t = SAMPLE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SAMPLE_SIZE as i64)
    )]
    sample_size: u32,

    /// Resampling filter used to shrink images to the sample raster
    #[arg(short, long, value_enum, default_value_t = Filter::Triangle)]
    filter: Filter,

    /// Emit one JSON object per input instead of plain text
    #[arg(long)]
    json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<Filter> for FilterType {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    let decoder = NativeDecoder::new(args.filter.into());
    let options = ExtractOptions::default()
        .color_count(args.count)
        .sample_size(args.sample_size);

    for input in &args.inputs {
        let source = ImageSource::from(input.as_str());
        let colors = pollster::block_on(extract(&decoder, &source, &options))
            .with_context(|| format!("extracting colors from {source}"))?;

        if args.json {
            println!("{}", json!({ "input": input, "colors": colors }));
        } else {
            println!("{input}: {}", colors.join(" "));
        }
    }

    Ok(())
}
