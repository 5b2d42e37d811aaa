//! Image decoding backends. Each one turns an [`ImageSource`] into a small
//! square RGBA raster that the extractor can scan.

use std::fmt;
use std::path::PathBuf;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, GenericImageView, RgbaImage, imageops::FilterType};

use crate::error::{ExtractError, Result};
use crate::extract::MAX_SAMPLE_SIZE;

/// Where the pixels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `http(s)://`, `data:`, `blob:` or `file://` URL.
    Url(String),
    /// Local file.
    Path(PathBuf),
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
}

const URL_SCHEMES: [&str; 5] = ["http:", "https:", "data:", "blob:", "file:"];

impl From<&str> for ImageSource {
    fn from(s: &str) -> Self {
        if URL_SCHEMES.iter().any(|scheme| s.starts_with(scheme)) {
            ImageSource::Url(s.to_owned())
        } else {
            ImageSource::Path(PathBuf::from(s))
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // data URIs can be megabytes long
            ImageSource::Url(url) if url.chars().count() > 64 => {
                write!(f, "{}...", url.chars().take(64).collect::<String>())
            }
            ImageSource::Url(url) => f.write_str(url),
            ImageSource::Path(path) => write!(f, "{}", path.display()),
            ImageSource::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Decodes an image and renders it into a `size`×`size` raster.
///
/// Loading happens at most once per call and cannot be cancelled; drop the
/// future to ignore its result.
#[allow(async_fn_in_trait)]
pub trait ImageDecoder {
    /// `true` when no graphics subsystem is available. Extraction then
    /// returns an empty list without calling [`ImageDecoder::decode`].
    fn is_headless(&self) -> bool {
        false
    }

    async fn decode(&self, source: &ImageSource, size: u32) -> Result<RgbaImage>;
}

/// Decoder backed by the `image` crate.
///
/// Reads bytes, local paths, `file://` URLs and base64 `data:` URIs. Remote
/// URLs need a browser and fail with [`ExtractError::Load`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeDecoder {
    pub filter: FilterType,
}

impl Default for NativeDecoder {
    fn default() -> Self {
        // Closest to a canvas drawImage with smoothing enabled.
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl NativeDecoder {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    /// Decode `source` at its full resolution.
    pub fn load(&self, source: &ImageSource) -> Result<DynamicImage> {
        let image = match source {
            ImageSource::Bytes(bytes) => image::load_from_memory(bytes)?,
            ImageSource::Path(path) => image::open(path)?,
            ImageSource::Url(url) => {
                if let Some(rest) = url.strip_prefix("data:") {
                    image::load_from_memory(&decode_data_uri(rest)?)?
                } else if let Some(path) = url.strip_prefix("file://") {
                    image::open(path)?
                } else {
                    return Err(ExtractError::Load(format!(
                        "{url}: remote sources need a browser decoder"
                    )));
                }
            }
        };
        Ok(image)
    }

    /// Synchronous form of [`ImageDecoder::decode`].
    pub fn decode_blocking(&self, source: &ImageSource, size: u32) -> Result<RgbaImage> {
        let image = self.load(source)?;
        log::trace!(
            "decoded {source} at {}x{}",
            image.width(),
            image.height()
        );
        Ok(render_square(&image, size, self.filter))
    }
}

impl ImageDecoder for NativeDecoder {
    async fn decode(&self, source: &ImageSource, size: u32) -> Result<RgbaImage> {
        self.decode_blocking(source, size)
    }
}

/// Stand-in for environments without any image or display backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessDecoder;

impl ImageDecoder for HeadlessDecoder {
    fn is_headless(&self) -> bool {
        true
    }

    async fn decode(&self, _source: &ImageSource, _size: u32) -> Result<RgbaImage> {
        Err(ExtractError::Render("no graphics backend available".into()))
    }
}

/// Stretch `image` onto a `size`×`size` raster, ignoring aspect ratio.
///
/// `size` is clamped to `1..=MAX_SAMPLE_SIZE`.
pub fn render_square(image: &DynamicImage, size: u32, filter: FilterType) -> RgbaImage {
    let size = size.clamp(1, MAX_SAMPLE_SIZE);

    // Fast path – no scaling required.
    if image.dimensions() == (size, size) {
        return image.to_rgba8();
    }

    image::imageops::resize(image, size, size, filter)
}

/// Payload of a `data:` URI, everything after the scheme.
fn decode_data_uri(rest: &str) -> Result<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExtractError::Load("data URI without a payload".into()))?;

    let is_base64 = meta
        .rsplit_once(';')
        .is_some_and(|(_, encoding)| encoding.eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Err(ExtractError::Load(format!(
            "unsupported data URI encoding: {meta}"
        )));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|e| ExtractError::Load(format!("invalid base64 payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png(image: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn guesses_source_kind() {
        assert_eq!(
            ImageSource::from("https://example.com/a.png"),
            ImageSource::Url("https://example.com/a.png".into())
        );
        assert_eq!(
            ImageSource::from("data:image/png;base64,AAAA"),
            ImageSource::Url("data:image/png;base64,AAAA".into())
        );
        assert_eq!(
            ImageSource::from("photos/cat.jpg"),
            ImageSource::Path(PathBuf::from("photos/cat.jpg"))
        );
    }

    #[test]
    fn renders_any_size_to_sample_square() {
        let wide = DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 80, Rgba([1, 2, 3, 255])));
        let raster = render_square(&wide, 50, FilterType::Nearest);
        assert_eq!(raster.dimensions(), (50, 50));
        assert!(raster.pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }

    #[test]
    fn exact_size_is_copied_untouched() {
        let source = RgbaImage::from_fn(50, 50, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let raster = render_square(&DynamicImage::ImageRgba8(source.clone()), 50, FilterType::Triangle);
        assert_eq!(raster, source);
    }

    #[test]
    fn decodes_png_bytes() {
        let bytes = png(&RgbaImage::from_pixel(7, 3, Rgba([9, 8, 7, 255])));
        let raster = NativeDecoder::default()
            .decode_blocking(&ImageSource::Bytes(bytes), 50)
            .expect("decode");
        assert_eq!(raster.dimensions(), (50, 50));
        assert_eq!(raster.get_pixel(25, 1).0, [9, 8, 7, 255]);
    }

    #[test]
    fn decodes_base64_data_uri() {
        let bytes = png(&RgbaImage::from_pixel(2, 2, Rgba([200, 50, 50, 255])));
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(bytes));
        let raster = NativeDecoder::default()
            .decode_blocking(&ImageSource::from(uri.as_str()), 4)
            .expect("decode");
        assert_eq!(raster.get_pixel(0, 0).0, [200, 50, 50, 255]);
    }

    #[test]
    fn base64_marker_is_case_insensitive() {
        let bytes = png(&RgbaImage::from_pixel(1, 1, Rgba([0, 0, 250, 255])));
        let uri = format!("data:image/png;BASE64,{}", STANDARD.encode(bytes));
        let raster = NativeDecoder::default()
            .decode_blocking(&ImageSource::from(uri.as_str()), 2)
            .expect("decode");
        assert_eq!(raster.get_pixel(1, 1).0, [0, 0, 250, 255]);
    }

    #[test]
    fn oversized_sample_is_capped() {
        let tiny = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([5, 5, 5, 255])));
        let raster = render_square(&tiny, 100_000, FilterType::Nearest);
        assert_eq!(raster.dimensions(), (MAX_SAMPLE_SIZE, MAX_SAMPLE_SIZE));
    }

    #[test]
    fn corrupt_bytes_are_a_load_error() {
        let err = NativeDecoder::default()
            .decode_blocking(&ImageSource::Bytes(b"not an image".to_vec()), 50)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Load(_)));
    }

    #[test]
    fn remote_and_malformed_urls_are_load_errors() {
        let decoder = NativeDecoder::default();
        for url in [
            "https://example.com/a.png",
            "data:image/png,rawbytes",
            "data:image/png;base64",
            "data:image/png;base64,@@@",
        ] {
            let err = decoder.decode_blocking(&ImageSource::from(url), 50).unwrap_err();
            assert!(matches!(err, ExtractError::Load(_)), "{url}: {err}");
        }
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = NativeDecoder::default()
            .decode_blocking(&ImageSource::Path("/nonexistent/nope.png".into()), 50)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Load(_)));
    }

    #[test]
    fn long_urls_are_shortened_for_display() {
        let uri = format!("data:image/png;base64,{}", "A".repeat(500));
        let shown = ImageSource::Url(uri).to_string();
        assert!(shown.len() < 80);
        assert!(shown.ends_with("..."));
    }
}
