mod utils;
pub mod aggregation;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod detectors;

use anyhow::Context;
use crate::common::{CoinBox, DetectorConfig, TensorLayout};
use crate::data::{FsAccess, LabelTable, TimeCalc, X};
use crate::detection_runners::{InferenceProcess, OnnxModelInfo};
use crate::detectors::{Detector, DetectorListener};

pub use crate::aggregation::{tally, total_value, CoinTally};
pub use crate::common::CoinClass;
pub use crate::data::DetectionEvent;

/// Builds a ready detector from a config.
///
/// Labels come from `labels_path`, from the `names` metadata of `model_path`, or from both
/// when their lengths agree. When a model file is given its declared output shape has to
/// match the engine's.
pub fn init_detector<E, L>(config: &DetectorConfig, engine: E, listener: L) -> anyhow::Result<Detector<E>>
where
    E: InferenceProcess,
    L: DetectorListener + 'static,
{
    log::info!("Initializing detector\n{}", config);

    let model_info = match &config.model_path {
        Some(path) => Some(OnnxModelInfo::load(FsAccess::Current.resolve(path)?)?),
        None => None,
    };

    if let Some(info) = &model_info {
        let declared = info.output_layout().context("Unusable model output")?;
        let engine_shape = engine.output_shape();
        if declared.shape()[..] != engine_shape[..] {
            anyhow::bail!(
                "Model declares output {:?} but the engine produces {:?}",
                declared.shape(),
                engine_shape
            );
        }
    }

    let file_labels = match &config.labels_path {
        Some(path) => Some(LabelTable::from_file(FsAccess::Current.resolve(path)?)?),
        None => None,
    };
    let model_names = model_info.and_then(|info| info.names);

    let labels = match (file_labels, model_names) {
        (Some(labels), Some(names)) => {
            if labels.len() != names.len() {
                anyhow::bail!(
                    "The lengths of parsed class names: {} and label file names: {} do not match.",
                    names.len(),
                    labels.len(),
                );
            }
            labels
        }
        (Some(labels), None) => labels,
        (None, Some(names)) => LabelTable::from(names),
        (None, None) => anyhow::bail!("No labels: set `labels_path` or use a model with `names` metadata."),
    };

    let detector = Detector::new(listener);
    detector.set_confidence_threshold(config.conf_threshold);
    detector.setup(engine, labels)?;
    Ok(detector)
}

/// The pipeline on its own: decode, filter and suppress one `[1, C, N]` output.
///
/// `Ok(None)` means nothing passed the confidence filter.
pub fn run_detection(layout: &TensorLayout, labels: &LabelTable, threshold: f32, output: &[f32]) -> anyhow::Result<Option<Vec<CoinBox>>> {
    let x = X::from(output.to_vec());
    detection_processing::process_predictions(&x, layout, labels, threshold, &mut TimeCalc::default())
}
