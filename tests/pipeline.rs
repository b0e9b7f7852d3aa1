//! End-to-end tests of the single-image pipelines with the real backend.

use assetpress::favicon::{FaviconConfig, FaviconFormat, IcoEncoding, generate_favicon};
use assetpress::imaging::{
    BackendError, Quality, RasterBackend, RustBackend, convert_to_avif, convert_to_jpeg,
    convert_to_png, convert_to_webp, resize,
};
use assetpress::{
    ErrorKind, ImageBlob, OptimizationConfig, OutputFormat, PipelineError, optimize_image,
    process_batch,
};
use image::{GenericImageView, Rgba, RgbaImage};
use proptest::prelude::*;
use std::io::Cursor;

fn png(name: &str, width: u32, height: u32) -> ImageBlob {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90, 255])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    ImageBlob::new(name, "image/png", bytes)
}

fn dimensions(blob: &ImageBlob) -> (u32, u32) {
    RustBackend
        .decode_to_surface(blob)
        .unwrap_or_else(|e| panic!("{}: {e}", blob.name()))
        .dimensions()
}

// =========================================================================
// Conversions
// =========================================================================

#[test]
fn conversions_tag_mime_and_extension() {
    let source = png("sunset.png", 24, 16);
    let q = Quality::new(75);
    let cases = [
        (convert_to_webp(&RustBackend, &source, q), "sunset.webp", "image/webp"),
        (convert_to_jpeg(&RustBackend, &source, q), "sunset.jpg", "image/jpeg"),
        (convert_to_png(&RustBackend, &source, q), "sunset.png", "image/png"),
        (convert_to_avif(&RustBackend, &source, q), "sunset.avif", "image/avif"),
    ];
    for (result, name, mime) in cases {
        let out = result.unwrap();
        assert_eq!(out.name(), name);
        assert_eq!(out.mime(), mime);
        assert_eq!(dimensions(&out), (24, 16), "{name}");
    }
}

#[test]
fn jpeg_conversion_fills_transparency_with_white() {
    let img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    let source = ImageBlob::new("clear.png", "image/png", bytes);

    let jpeg = convert_to_jpeg(&RustBackend, &source, Quality::new(95)).unwrap();
    let decoded = image::load_from_memory(jpeg.bytes()).unwrap().to_rgb8();
    for pixel in decoded.pixels() {
        assert!(pixel.0.iter().all(|&c| c >= 250), "{pixel:?}");
    }
}

#[test]
fn png_reencode_is_lossless_at_any_quality() {
    let source = png("a.png", 33, 21);
    let original = image::load_from_memory(source.bytes()).unwrap().to_rgba8();
    for quality in [1, 50, 100] {
        let out = convert_to_png(&RustBackend, &source, Quality::new(quality)).unwrap();
        let decoded = image::load_from_memory(out.bytes()).unwrap();
        assert_eq!(decoded.dimensions(), (33, 21));
        assert_eq!(decoded.to_rgba8(), original);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn resize_produces_exact_dimensions(width in 1u32..=64, height in 1u32..=64) {
        let source = png("src.png", 17, 11);
        let out = resize(&RustBackend, &source, width, height).unwrap();
        prop_assert_eq!(out.name(), "src.png");
        prop_assert_eq!(out.mime(), "image/png");
        prop_assert_eq!(dimensions(&out), (width, height));
    }
}

#[test]
fn webp_beyond_libwebp_limit_is_encode_error() {
    let wide = png("wide.png", 16384, 1);
    let err = convert_to_webp(&RustBackend, &wide, Quality::new(80)).unwrap_err();
    assert!(matches!(err, BackendError::Encode { .. }), "{err}");
    let err = convert_to_webp(&RustBackend, &wide, Quality::new(100)).unwrap_err();
    assert!(matches!(err, BackendError::Encode { .. }), "{err}");
}

// =========================================================================
// optimize_image
// =========================================================================

#[test]
fn optimize_resizes_when_both_bounds_set() {
    let config = OptimizationConfig {
        format: OutputFormat::WebP,
        quality: 80,
        max_width: 40,
        max_height: 10,
    };
    let out = optimize_image(&png("wide.png", 100, 100), &config).unwrap();
    assert_eq!(out.name(), "wide.webp");
    assert_eq!(dimensions(&out), (40, 10));
}

#[test]
fn optimize_ignores_partial_bounds() {
    let config = OptimizationConfig {
        format: OutputFormat::Jpeg,
        quality: 80,
        max_width: 100,
        max_height: 0,
    };
    let out = optimize_image(&png("photo.png", 64, 48), &config).unwrap();
    assert_eq!(out.mime(), "image/jpeg");
    assert_eq!(dimensions(&out), (64, 48));
}

#[test]
fn optimize_original_keeps_format() {
    let config = OptimizationConfig {
        format: OutputFormat::Original,
        quality: 80,
        max_width: 8,
        max_height: 8,
    };
    let out = optimize_image(&png("x.png", 32, 32), &config).unwrap();
    assert_eq!(out.name(), "x.png");
    assert_eq!(out.mime(), "image/png");
    assert_eq!(dimensions(&out), (8, 8));
}

#[test]
fn optimize_rejects_garbage() {
    let blob = ImageBlob::new("notes.png", "image/png", b"plain text".to_vec());
    let err = optimize_image(&blob, &OptimizationConfig::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Decode(_)));
}

#[cfg(not(feature = "heic"))]
#[test]
fn heic_without_support_is_legacy_conversion_error() {
    let blob = ImageBlob::new("IMG_0001.HEIC", "image/heic", vec![0; 32]);
    let err = optimize_image(&blob, &OptimizationConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LegacyConversion);
}

#[test]
fn format_strings_parse_into_closed_enum() {
    assert_eq!("WEBP".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);
    assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
    let err = "tga".parse::<OutputFormat>().unwrap_err();
    assert_eq!(err.to_string(), "Unsupported format: tga");
    let err: PipelineError = err.into();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

// =========================================================================
// Batch
// =========================================================================

#[test]
fn batch_skips_invalid_file() {
    let blobs = vec![
        png("one.png", 10, 10),
        ImageBlob::new("two.png", "image/png", vec![0xde, 0xad, 0xbe, 0xef]),
        png("three.png", 12, 8),
    ];
    let report = process_batch(&blobs, &OptimizationConfig::default());

    assert_eq!(report.outputs.len(), 2);
    assert_eq!(report.outputs[0].name(), "one.webp");
    assert_eq!(report.outputs[1].name(), "three.webp");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "two.png");
    assert_eq!(report.failures[0].kind, ErrorKind::Decode);
}

#[test]
fn batch_survives_encode_failure() {
    let blobs = vec![
        png("panorama.png", 16384, 1),
        png("thumb.png", 10, 10),
    ];
    let report = process_batch(&blobs, &OptimizationConfig::default());

    assert_eq!(report.outputs.len(), 1);
    assert_eq!(report.outputs[0].name(), "thumb.webp");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "panorama.png");
    assert_eq!(report.failures[0].kind, ErrorKind::Encode);
}

#[test]
fn batch_numbers_outputs_sharing_a_stem() {
    let jpeg = convert_to_jpeg(&RustBackend, &png("a.png", 6, 6), Quality::new(90)).unwrap();
    assert_eq!(jpeg.name(), "a.jpg");
    let blobs = vec![png("a.png", 6, 6), jpeg, png("a.gif.png", 6, 6)];

    let report = process_batch(&blobs, &OptimizationConfig::default());
    let names: Vec<&str> = report.outputs.iter().map(|b| b.name()).collect();
    assert_eq!(names, ["a.webp", "a-1.webp", "a.gif.webp"]);
    assert!(report.failures.is_empty());
}

// =========================================================================
// Favicon
// =========================================================================

#[test]
fn favicon_png_collapses_to_largest() {
    let config = FaviconConfig {
        sizes: vec![16, 32, 48],
        output_format: FaviconFormat::Png,
        ..FaviconConfig::default()
    };
    let out = generate_favicon(&png("logo.png", 100, 100), &config).unwrap();
    assert_eq!(out.name(), "favicon-48x48.png");
    assert_eq!(dimensions(&out), (48, 48));
}

#[test]
fn favicon_ico_default_is_png_payload() {
    let out = generate_favicon(&png("logo.png", 100, 100), &FaviconConfig::default()).unwrap();
    assert_eq!(out.name(), "favicon.ico");
    assert_eq!(out.mime(), "image/x-icon");
    assert_eq!(
        image::guess_format(out.bytes()).unwrap(),
        image::ImageFormat::Png
    );
    assert_eq!(dimensions(&out), (48, 48));
}

#[test]
fn favicon_ico_container_has_every_size() {
    let config = FaviconConfig {
        sizes: vec![48, 16, 32],
        output_format: FaviconFormat::Ico,
        ico_encoding: IcoEncoding::Container,
    };
    let out = generate_favicon(&png("logo.png", 100, 100), &config).unwrap();
    let dir = ico::IconDir::read(Cursor::new(out.bytes().to_vec())).unwrap();
    let sizes: Vec<(u32, u32)> = dir
        .entries()
        .iter()
        .map(|e| (e.width(), e.height()))
        .collect();
    assert_eq!(sizes, vec![(16, 16), (32, 32), (48, 48)]);
}
