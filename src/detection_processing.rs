use std::time::Instant;
use ndarray::Axis;
use rayon::prelude::*;
use crate::common::{CoinBox, TensorLayout, BOX_CHANNELS};
use crate::data::{ConfidenceThreshold, LabelTable, TimeCalc, X};
use crate::detection_runners::nms::{nms, IOU_THRESHOLD};
use crate::utils;

// Stage slots in `TimeCalc`.
pub const STAGE_INFERENCE: usize = 0;
pub const STAGE_DECODE: usize = 1;
pub const STAGE_NMS: usize = 2;

/// Best class of one anchor, before any thresholding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    pub score: f32,
    pub class_index: usize,
}

/// Reads one candidate per anchor from a `[1, C, N]` output.
///
/// Channel `j` of anchor `c` sits at flat index `c + N * j`. The class is the arg-max over
/// the score channels; on ties the lowest class index wins and NaN scores are skipped.
pub fn decode_predictions(output: &X, layout: &TensorLayout) -> anyhow::Result<Vec<Candidate>> {
    let preds = output.channels_view(layout)?;

    let candidates = preds
        .axis_iter(Axis(1))
        .into_par_iter()
        .map(|anchor| {
            let mut score = f32::NEG_INFINITY;
            let mut class_index = 0;
            for (i, &s) in anchor.iter().skip(BOX_CHANNELS).enumerate() {
                if s > score {
                    score = s;
                    class_index = i;
                }
            }
            Candidate {
                cx: anchor[0],
                cy: anchor[1],
                w: anchor[2],
                h: anchor[3],
                score,
                class_index,
            }
        })
        .collect();

    Ok(candidates)
}

/// Keeps candidates scoring strictly above `threshold` whose box lies entirely inside the frame.
///
/// Boxes crossing the frame edge, or with inverted corners from a negative size, are dropped, not clamped.
///
/// # Panics
///
/// When a surviving candidate's class has no label.
pub fn filter_candidates(candidates: &[Candidate], threshold: f32, labels: &LabelTable) -> Vec<CoinBox> {
    candidates
        .iter()
        .filter(|c| ConfidenceThreshold::check_conf(threshold, c.score))
        .filter_map(|c| {
            let bbox = CoinBox::from_cxcy_wh(c.cx, c.cy, c.w, c.h).with_confidence(c.score);
            if !bbox.is_normalized() {
                return None;
            }
            Some(bbox.with_class(c.class_index, labels.get(c.class_index)))
        })
        .collect()
}

/// Decode, filter and suppress one output tensor.
///
/// Returns `None` when nothing passes the filter, otherwise the suppressed boxes in
/// selection order (highest confidence first).
pub fn process_predictions(output: &X, layout: &TensorLayout, labels: &LabelTable, threshold: f32,
                           timings: &mut TimeCalc) -> anyhow::Result<Option<Vec<CoinBox>>> {
    let now = Instant::now();
    let mut _detect_elapsed = now.elapsed();

    let candidates = decode_predictions(output, layout)?;
    let mut boxes = filter_candidates(&candidates, threshold, labels);
    timings.add_or_push(STAGE_DECODE, now.elapsed() - _detect_elapsed);
    _detect_elapsed = utils::trace("TIME", "Decode + filter", now, _detect_elapsed);

    if boxes.is_empty() {
        return Ok(None);
    }

    nms(&mut boxes, IOU_THRESHOLD);
    timings.add_or_push(STAGE_NMS, now.elapsed() - _detect_elapsed);
    utils::trace("TIME", "NMS", now, _detect_elapsed);

    Ok(Some(boxes))
}
