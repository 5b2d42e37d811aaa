use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use pollster::block_on;
use prominent_colors_wasm::{
    ExtractError, ExtractOptions, HeadlessDecoder, ImageSource, NativeDecoder, extract,
    extract_colors_from_bytes, is_similar,
};

fn encode(image: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test image");
    buf
}

/// Left two thirds teal, right third orange.
fn two_tone(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, _| {
        if x < width * 2 / 3 {
            Rgba([20, 160, 150, 255])
        } else {
            Rgba([240, 130, 20, 255])
        }
    })
}

#[test]
fn headless_environment_yields_empty_list() {
    let source = ImageSource::from("https://example.com/cover.png");
    let colors = block_on(extract(&HeadlessDecoder, &source, &ExtractOptions::default()))
        .expect("headless extraction never fails");
    assert!(colors.is_empty());
}

#[test]
fn extracts_from_file_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("two_tone.png");
    two_tone(50, 50).save(&path).expect("write png");

    let options = ExtractOptions::default().color_count(5);
    let decoder = NativeDecoder::default();
    let colors = block_on(extract(&decoder, &ImageSource::Path(path.clone()), &options)).expect("extract");
    assert_eq!(colors, vec!["#14a096", "#f08214"]);

    let url = format!("file://{}", path.display());
    let from_url = block_on(extract(&decoder, &ImageSource::from(url.as_str()), &options)).expect("extract");
    assert_eq!(from_url, colors);
}

#[test]
fn smoothing_filter_keeps_result_dissimilar_and_bounded() {
    let bytes = encode(&two_tone(301, 97), ImageFormat::Png);
    let options = ExtractOptions::default().color_count(3);
    let colors = block_on(extract(&NativeDecoder::default(), &ImageSource::Bytes(bytes), &options))
        .expect("extract");

    assert!(!colors.is_empty() && colors.len() <= 3);
    assert_eq!(colors[0], "#14a096");
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            assert!(!is_similar(a, b), "{a} and {b} are too close");
        }
    }
}

#[test]
fn missing_file_rejects_with_load_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = ImageSource::Path(dir.path().join("missing.png"));
    let err = block_on(extract(&NativeDecoder::default(), &source, &ExtractOptions::default())).unwrap_err();
    assert!(matches!(err, ExtractError::Load(_)), "{err}");
}

#[test]
fn bytes_helper_matches_async_pipeline() {
    let bytes = encode(&two_tone(50, 50), ImageFormat::Png);
    let sync = extract_colors_from_bytes(&bytes, 4).expect("extract");
    let async_ = block_on(extract(
        &NativeDecoder::default(),
        &ImageSource::Bytes(bytes),
        &ExtractOptions::default().color_count(4),
    ))
    .expect("extract");

    assert_eq!(sync, async_);
    assert_eq!(sync, vec!["#14a096", "#f08214"]);
}

#[test]
fn bytes_helper_rejects_garbage() {
    assert!(matches!(
        extract_colors_from_bytes(b"\x89PNG but not really", 5),
        Err(ExtractError::Load(_))
    ));
}
