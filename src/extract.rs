//! Dominant-color extraction: sample, quantize, rank by frequency, deduplicate.

use std::collections::HashMap;

use image::RgbaImage;
use palette::Srgb;

use crate::decoder::{ImageDecoder, ImageSource};
use crate::error::Result;
use crate::hex::{SIMILARITY_THRESHOLD, color_distance, srgb_to_hex};

/// Side length of the square raster every source is rendered into.
pub const SAMPLE_SIZE: u32 = 50;
/// Largest sample raster side accepted, 4 MiB of RGBA.
pub const MAX_SAMPLE_SIZE: u32 = 1024;
/// Number of colors returned when the caller does not ask for a specific count.
pub const DEFAULT_COLOR_COUNT: usize = 5;
/// Pixels with alpha below this do not contribute.
pub const MIN_ALPHA: u8 = 128;
/// Channels are rounded to multiples of this before counting.
pub const QUANTIZE_STEP: u8 = 10;

/// Tunables for a single extraction. `Default` reproduces the fixed behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub color_count: usize,
    pub sample_size: u32,
    pub min_alpha: u8,
    pub quantize_step: u8,
    pub similarity_threshold: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            color_count: DEFAULT_COLOR_COUNT,
            sample_size: SAMPLE_SIZE,
            min_alpha: MIN_ALPHA,
            quantize_step: QUANTIZE_STEP,
            similarity_threshold: SIMILARITY_THRESHOLD,
        }
    }
}

impl ExtractOptions {
    /// Requested number of colors. Negative counts behave like 0.
    pub fn color_count(mut self, count: i64) -> Self {
        self.color_count = usize::try_from(count).unwrap_or(0);
        self
    }

    /// Clamped to `1..=MAX_SAMPLE_SIZE`.
    pub fn sample_size(mut self, size: u32) -> Self {
        self.sample_size = size.clamp(1, MAX_SAMPLE_SIZE);
        self
    }

    pub fn min_alpha(mut self, alpha: u8) -> Self {
        self.min_alpha = alpha;
        self
    }

    pub fn quantize_step(mut self, step: u8) -> Self {
        self.quantize_step = step.max(1);
        self
    }

    pub fn similarity_threshold(mut self, threshold: u32) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

/// A quantized color and how many sampled pixels fell into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub color: Srgb<u8>,
    pub count: usize,
}

/// Round a channel half-up to the nearest multiple of `step`.
///
/// The result never exceeds the largest multiple of `step` that fits in a
/// byte, so 255 with a step of 10 lands on 250.
pub fn quantize_channel(channel: u8, step: u8) -> u8 {
    let step = u16::from(step.max(1));
    let ceiling = 255 / step * step;
    let rounded = (u16::from(channel) + step / 2) / step * step;
    // ceiling <= 255
    rounded.min(ceiling) as u8
}

/// Count quantized colors of every sufficiently opaque pixel, in row-major order.
///
/// Buckets come back in the order their color was first seen.
pub fn count_buckets(raster: &RgbaImage, options: &ExtractOptions) -> Vec<Bucket> {
    let mut index: HashMap<[u8; 3], usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for pixel in raster.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < options.min_alpha {
            continue;
        }

        let key = [r, g, b].map(|c| quantize_channel(c, options.quantize_step));
        match index.get(&key) {
            Some(&i) => buckets[i].count += 1,
            None => {
                index.insert(key, buckets.len());
                buckets.push(Bucket {
                    color: Srgb::new(key[0], key[1], key[2]),
                    count: 1,
                });
            }
        }
    }

    buckets
}

/// Sort buckets by descending count. Equal counts keep their first-seen order.
pub fn rank_buckets(mut buckets: Vec<Bucket>) -> Vec<Bucket> {
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Greedily accept ranked colors that are not within `threshold` of any
/// already accepted color, stopping at `count`.
pub fn select_prominent(ranked: &[Bucket], count: usize, threshold: u32) -> Vec<Srgb<u8>> {
    let mut selected: Vec<Srgb<u8>> = Vec::with_capacity(count.min(ranked.len()));

    for bucket in ranked {
        if selected.len() >= count {
            break;
        }
        if selected
            .iter()
            .all(|&kept| color_distance(kept, bucket.color) >= threshold)
        {
            selected.push(bucket.color);
        }
    }

    selected
}

/// Run the counting, ranking and selection steps over an already sampled raster.
pub fn prominent_colors(raster: &RgbaImage, options: &ExtractOptions) -> Vec<String> {
    let buckets = count_buckets(raster, options);
    log::trace!(
        "{} buckets from {}x{} raster",
        buckets.len(),
        raster.width(),
        raster.height()
    );

    let ranked = rank_buckets(buckets);
    let selected = select_prominent(&ranked, options.color_count, options.similarity_threshold);
    let colors: Vec<String> = selected.into_iter().map(srgb_to_hex).collect();

    log::debug!("prominent colors: {colors:?}");
    colors
}

/// Decode `source`, render it to the sample raster and return its most
/// prominent colors, most frequent first.
///
/// A headless decoder yields an empty list rather than an error.
pub async fn extract<D: ImageDecoder>(
    decoder: &D,
    source: &ImageSource,
    options: &ExtractOptions,
) -> Result<Vec<String>> {
    if decoder.is_headless() {
        log::debug!("no graphics backend available, skipping extraction");
        return Ok(Vec::new());
    }

    let raster = decoder.decode(source, options.sample_size).await?;
    Ok(prominent_colors(&raster, options))
}
