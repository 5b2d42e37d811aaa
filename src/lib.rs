//! Client-side image and input utilities for the web app.
//!
//! The main entry point picks the handful of colors that dominate an image:
//! the image is drawn onto a 50×50 raster, opaque pixels are rounded to a
//! coarse RGB grid, the resulting buckets are ranked by how many pixels they
//! hold, and near-duplicates of an already chosen color are skipped.
//!
//! ```rust,no_run
//! use prominent_colors_wasm::{ExtractOptions, ImageSource, NativeDecoder, extract};
//!
//! let source = ImageSource::from("cover.png");
//! let colors = pollster::block_on(extract(&NativeDecoder::default(), &source, &ExtractOptions::default()))?;
//! println!("{colors:?}"); // ["#c83232", "#fafafa", ...]
//! # Ok::<(), prominent_colors_wasm::ExtractError>(())
//! ```
//!
//! In the browser the same pipeline is exported as `extractColorsFromImage`,
//! decoding through `<img>` and `<canvas>`.

pub mod debounce;
pub mod decoder;
pub mod error;
pub mod extract;
pub mod hex;
pub mod shortcuts;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use decoder::{HeadlessDecoder, ImageDecoder, ImageSource, NativeDecoder};
pub use error::{ExtractError, Result};
pub use extract::{DEFAULT_COLOR_COUNT, ExtractOptions, SAMPLE_SIZE, extract, prominent_colors};
pub use hex::{hex_to_rgb, is_similar, rgb_to_hex};

/// Prominent colors of an encoded image held in memory.
///
/// Blocking counterpart of [`extract`] for callers without an executor.
pub fn extract_colors_from_bytes(input: &[u8], color_count: i64) -> Result<Vec<String>> {
    let options = ExtractOptions::default().color_count(color_count);
    let image = image::load_from_memory(input)?;
    let filter = NativeDecoder::default().filter;
    let raster = decoder::render_square(&image, options.sample_size, filter);
    Ok(prominent_colors(&raster, &options))
}
