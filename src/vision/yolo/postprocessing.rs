// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 output decoding and non-maximum suppression
//!
//! The detection head emits `[1, 4 + nc, N]` (or the transposed
//! `[1, N, 4 + nc]`): per anchor, a center-format box in model pixels
//! followed by one score per class. There is no objectness column.

use anyhow::Result;
use ndarray::{ArrayViewD, IxDyn};

use super::classes::class_name;
use super::preprocessing::LetterboxInfo;
use crate::vision::detection::DetectionResult;

/// Thresholds applied while decoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    /// Cap on detections returned per image
    pub max_detections: usize,
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

/// Candidate box in original-image coordinates, before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub score: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &Candidate) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// Decode raw model output into detections for the original image
pub fn decode_predictions(
    output: ArrayViewD<f32>,
    letterbox: &LetterboxInfo,
    params: &YoloParams,
) -> Result<Vec<DetectionResult>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected YOLO output shape: {:?}", shape);
    }

    // The attribute axis is the short one: 84 vs 8400 anchors for COCO
    let channels_first = shape[1] <= shape[2];
    let (num_attrs, num_anchors) = if channels_first {
        (shape[1], shape[2])
    } else {
        (shape[2], shape[1])
    };
    if num_attrs <= 4 {
        anyhow::bail!("YOLO output has no class scores: {:?}", shape);
    }
    let num_classes = num_attrs - 4;

    let at = |anchor: usize, attr: usize| -> f32 {
        if channels_first {
            output[IxDyn(&[0, attr, anchor])]
        } else {
            output[IxDyn(&[0, anchor, attr])]
        }
    };

    let mut candidates = Vec::new();
    for anchor in 0..num_anchors {
        let (class_id, score) = (0..num_classes)
            .map(|c| (c, at(anchor, 4 + c)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if score < params.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(anchor, 0), at(anchor, 1), at(anchor, 2), at(anchor, 3));
        let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);

        candidates.push(Candidate {
            class_id,
            score,
            x1,
            y1,
            x2,
            y2,
        });
    }

    let kept = non_max_suppression(candidates, params.iou_threshold, params.max_detections);

    let max_x = letterbox.orig_width as f32;
    let max_y = letterbox.orig_height as f32;
    Ok(kept
        .into_iter()
        .map(|c| {
            let bbox = [
                c.x1.clamp(0.0, max_x).round() as i32,
                c.y1.clamp(0.0, max_y).round() as i32,
                c.x2.clamp(0.0, max_x).round() as i32,
                c.y2.clamp(0.0, max_y).round() as i32,
            ];
            DetectionResult::new(class_name(c.class_id, num_classes), c.score, bbox)
        })
        .collect())
}

/// Class-wise NMS; output is sorted by descending score
pub fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
