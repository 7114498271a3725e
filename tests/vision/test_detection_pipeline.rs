// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Decode, detect and annotate without the HTTP layer

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use vision_relay::{
    api::{detect::run_detection, ApiError},
    vision::{Annotator, DetectionResult, ObjectDetector},
};

const LIMIT: usize = 1024 * 1024;

/// Reports one box covering the left half of the image
struct HalfDetector;

impl ObjectDetector for HalfDetector {
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<Vec<DetectionResult>> {
        let (w, h) = image.dimensions();
        Ok(vec![DetectionResult::new(
            "dog",
            0.66,
            [0, 20, (w / 2) as i32, h as i32 - 1],
        )])
    }

    fn name(&self) -> &str {
        "half"
    }
}

struct FailingDetector;

impl ObjectDetector for FailingDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<DetectionResult>> {
        anyhow::bail!("session exploded")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 40, 40])));
    let mut cursor = std::io::Cursor::new(Vec::new());
    image.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
    cursor.into_inner()
}

#[test]
fn test_annotated_output_keeps_dimensions() {
    let (results, annotated) =
        run_detection(&HalfDetector, &Annotator::default(), &png(80, 60), LIMIT).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label(), "dog 0.66");

    let bytes = STANDARD.decode(annotated).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (80, 60));

    // Box edge is drawn in green; JPEG shifts colors slightly
    let edge = decoded.to_rgb8().get_pixel(0, 40).0;
    assert!(edge[1] as i32 - edge[0] as i32 > 60);
}

#[test]
fn test_inference_failure_is_internal_error() {
    let err = run_detection(&FailingDetector, &Annotator::default(), &png(8, 8), LIMIT).unwrap_err();

    match err {
        ApiError::InternalError(detail) => {
            assert!(detail.starts_with("Internal Server Error during detection"));
            assert!(detail.contains("session exploded"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_oversized_upload_rejected() {
    let err = run_detection(&HalfDetector, &Annotator::default(), &png(64, 64), 16).unwrap_err();
    assert_eq!(err.status_code(), 400);
}
