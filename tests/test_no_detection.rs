use std::sync::Arc;
use std::time::Duration;
use approx::assert_abs_diff_eq;
use crossbeam_channel::{Receiver, Sender};
use coin_detect::data::{frame_channel, DetectionEvent, LabelTable, X};
use coin_detect::detection_runners::InferenceProcess;
use coin_detect::detectors::{detector_worker, Detector};
use coin_detect::{run_detection, tally};

use tensors::*;

#[test]
fn nothing_above_threshold_is_empty() {
    let flat = tensor(&[
        anchor(0.3, 0.3, 0.2, 0.2, CLASS_1, 0.2),
        anchor(0.6, 0.6, 0.2, 0.2, CLASS_10, 0.4),
    ]);

    let result = run_detection(&layout(2), &labels(), 0.5, &flat).unwrap();

    assert!(result.is_none());
    assert_abs_diff_eq!(DetectionEvent::Empty.tally().total, 0.);
}

#[test]
fn detector_reports_empty_frames() {
    let flat = tensor(&[anchor(0.3, 0.3, 0.2, 0.2, CLASS_1, 0.2)]);
    let (tx, rx) = crossbeam_channel::unbounded();
    let detector = Detector::new(tx);
    detector.setup(ReplayEngine::new(1, vec![flat]), labels()).unwrap();

    detector.detect(&0);

    assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), DetectionEvent::Empty);
}

#[test]
fn ambiguous_coins_without_reference_count_nothing() {
    let flat = tensor(&[
        anchor(0.25, 0.5, 0.2, 0.2, CLASS_EAGLE, 0.9),
        anchor(0.75, 0.5, 0.25, 0.25, CLASS_EAGLE, 0.8),
    ]);

    let boxes = run_detection(&layout(2), &labels(), 0.5, &flat).unwrap().unwrap();
    let result = tally(&boxes);

    assert_eq!(boxes.len(), 2);
    assert_eq!(result.values, vec![None, None]);
    assert!(result.calibration.is_none());
    assert_abs_diff_eq!(result.total, 0.);
}

#[test]
fn explicit_coins_count_without_reference() {
    let flat = tensor(&[
        anchor(0.25, 0.5, 0.2, 0.2, CLASS_EAGLE, 0.9),
        anchor(0.75, 0.5, 0.25, 0.25, CLASS_10, 0.8),
    ]);

    let boxes = run_detection(&layout(2), &labels(), 0.5, &flat).unwrap().unwrap();

    assert_abs_diff_eq!(tally(&boxes).total, 10.);
}

#[test]
fn detect_before_setup_does_nothing() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let detector: Detector<ReplayEngine> = Detector::new(tx);

    assert!(!detector.is_ready());
    detector.detect(&0);
    detector.detect_tensor(&tensor(&[anchor(0.5, 0.5, 0.2, 0.2, CLASS_1, 0.9)]));

    assert!(rx.try_recv().is_err());
    assert!(detector.average_stage_times().is_empty());
}

#[test]
fn detect_after_clear_does_nothing() {
    let flat = tensor(&[anchor(0.5, 0.5, 0.2, 0.2, CLASS_1, 0.9)]);
    let (tx, rx) = crossbeam_channel::unbounded();
    let detector = Detector::new(tx);
    detector.setup(ReplayEngine::new(1, vec![flat.clone(), flat]), labels()).unwrap();

    detector.clear();
    detector.detect(&0);

    assert!(!detector.is_ready());
    assert!(rx.try_recv().is_err());
}

#[test]
fn failed_inference_drops_the_frame() {
    let (tx, rx) = crossbeam_channel::unbounded();
    let detector = Detector::new(tx);
    detector.setup(ReplayEngine::new(1, vec![]), labels()).unwrap();

    detector.detect(&0);
    detector.detect_tensor(&[0.5; 3]);

    assert!(rx.try_recv().is_err());
    assert!(detector.is_ready());
}

#[test]
fn setup_rejects_too_few_labels() {
    let (tx, _rx) = crossbeam_channel::unbounded();
    let detector = Detector::new(tx);

    let result = detector.setup(ReplayEngine::new(1, vec![]), LabelTable::from(&["$1", "$2"][..]));

    assert!(result.is_err());
    assert!(!detector.is_ready());
}

#[test]
fn setup_rejects_non_detection_output() {
    let (tx, _rx) = crossbeam_channel::unbounded();
    let detector = Detector::new(tx);
    let mut engine = ReplayEngine::new(1, vec![]);
    engine.shape = vec![1, 1000];

    assert!(detector.setup(engine, labels()).is_err());
    assert!(!detector.is_ready());
}

#[test]
fn setup_accepts_extra_labels() {
    let (tx, _rx) = crossbeam_channel::unbounded();
    let detector = Detector::new(tx);
    let mut names: Vec<String> = LABELS.iter().map(|x| x.to_string()).collect();
    names.push("$20".to_string());

    detector.setup(ReplayEngine::new(1, vec![]), LabelTable::from(names)).unwrap();

    assert!(detector.is_ready());
}

/// Engine that signals when inference starts and waits for a release before returning.
struct GatedEngine {
    started: Sender<()>,
    release: Receiver<()>,
    output: Vec<f32>,
}

impl InferenceProcess for GatedEngine {
    type Input = u32;

    fn output_shape(&self) -> Vec<usize> {
        layout(1).shape().to_vec()
    }

    fn inference(&mut self, _frame: &u32) -> anyhow::Result<X> {
        self.started.send(())?;
        self.release.recv()?;
        Ok(X::from(self.output.clone()))
    }
}

#[test]
fn frames_arriving_mid_inference_are_dropped() {
    let flat = tensor(&[anchor(0.5, 0.5, 0.2, 0.2, CLASS_5, 0.9)]);
    let (started_tx, started_rx) = crossbeam_channel::unbounded();
    let (release_tx, release_rx) = crossbeam_channel::unbounded();
    let (tx, rx) = crossbeam_channel::unbounded();
    let detector = Arc::new(Detector::new(tx));
    let engine = GatedEngine { started: started_tx, release: release_rx, output: flat.clone() };
    detector.setup(engine, labels()).unwrap();

    let first = {
        let detector = detector.clone();
        std::thread::spawn(move || detector.detect(&0))
    };
    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    // The first frame holds the session, these return without running.
    detector.detect(&1);
    detector.detect_tensor(&flat);
    assert!(rx.try_recv().is_err());

    release_tx.send(()).unwrap();
    first.join().unwrap();

    let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_abs_diff_eq!(event.tally().total, 5.);
    assert!(rx.try_recv().is_err());
    assert!(started_rx.try_recv().is_err());
}

#[test]
fn worker_stops_when_frame_source_closes() {
    let frames: Vec<Vec<f32>> = (0..3)
        .map(|_| tensor(&[anchor(0.5, 0.5, 0.2, 0.2, CLASS_2, 0.9)]))
        .collect();
    let (tx, rx) = crossbeam_channel::unbounded();
    let detector = Arc::new(Detector::new(tx));
    detector.setup(ReplayEngine::new(1, frames), labels()).unwrap();

    let (frame_tx, frame_rx) = frame_channel::<u32>();
    let worker = {
        let detector = detector.clone();
        std::thread::spawn(move || detector_worker(detector, frame_rx))
    };

    frame_tx.send(1);
    let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_abs_diff_eq!(first.tally().total, 2.);

    drop(frame_tx);
    worker.join().unwrap();
}

#[test]
fn frame_queue_keeps_only_latest() {
    let (frame_tx, frame_rx) = frame_channel::<u32>();

    frame_tx.send(1);
    frame_tx.send(2);
    frame_tx.send(3);

    assert_eq!(frame_rx.recv(), Some(3));
    drop(frame_tx);
    assert_eq!(frame_rx.recv(), None);
}
