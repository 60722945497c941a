use std::sync::Arc;
use std::time::{Duration, Instant};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use crate::common::{CoinBox, TensorLayout};
use crate::data::{ConfidenceThreshold, DetectionEvent, FrameReceiver, LabelTable, TimeCalc, X};
use crate::detection_processing::{self, STAGE_DECODE, STAGE_INFERENCE, STAGE_NMS};
use crate::detection_runners::InferenceProcess;

/// Receives the result of every processed frame.
///
/// Called on the detection thread; implementations hand the result over to wherever the
/// presentation layer lives.
pub trait DetectorListener: Send + Sync {
    fn on_empty_detect(&self);
    fn on_detect(&self, boxes: &[CoinBox], elapsed: Duration);
}

impl DetectorListener for Sender<DetectionEvent> {
    fn on_empty_detect(&self) {
        if self.send(DetectionEvent::Empty).is_err() {
            log::debug!("Detection listener is gone, result dropped");
        }
    }

    fn on_detect(&self, boxes: &[CoinBox], elapsed: Duration) {
        let event = DetectionEvent::Detections { boxes: boxes.to_vec(), elapsed };
        if self.send(event).is_err() {
            log::debug!("Detection listener is gone, result dropped");
        }
    }
}

#[derive(Debug)]
struct DetectorSession<E> {
    engine: E,
    layout: TensorLayout,
    labels: LabelTable,
    infer_time: TimeCalc,
}

/// Runs the coin pipeline on frames and reports to a listener.
///
/// Unusable until `setup` succeeds, and again after `clear`; frames given to it in
/// those states are ignored.
pub struct Detector<E: InferenceProcess> {
    session: Mutex<Option<DetectorSession<E>>>,
    threshold: ConfidenceThreshold,
    listener: Box<dyn DetectorListener>,
}

impl<E: InferenceProcess> Detector<E> {
    pub fn new<L: DetectorListener + 'static>(listener: L) -> Self {
        Self {
            session: Mutex::new(None),
            threshold: ConfidenceThreshold::default(),
            listener: Box::new(listener),
        }
    }

    /// Binds the engine and label table. Fails, leaving the detector unusable, when the
    /// engine's output is not a `[1, C, N]` detection head or when some class has no label.
    pub fn setup(&self, engine: E, labels: LabelTable) -> anyhow::Result<()> {
        let layout = TensorLayout::from_shape(&engine.output_shape())?;

        if labels.len() < layout.num_classes() {
            anyhow::bail!(
                "Model has {} classes but only {} labels were loaded",
                layout.num_classes(),
                labels.len()
            );
        }
        if labels.len() > layout.num_classes() {
            log::warn!(
                "{} labels loaded for a model with {} classes, the extra labels are never used",
                labels.len(),
                layout.num_classes()
            );
        }

        log::info!(
            "Detector ready | Output: {:?} | Classes: {} | Threshold: {}",
            layout.shape(),
            layout.num_classes(),
            self.threshold.get()
        );

        *self.session.lock() = Some(DetectorSession {
            engine,
            layout,
            labels,
            infer_time: TimeCalc::default(),
        });
        Ok(())
    }

    pub fn set_confidence_threshold(&self, threshold: f32) {
        self.threshold.set(threshold);
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.threshold.get()
    }

    pub fn is_ready(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Runs inference and the pipeline on one frame.
    ///
    /// A frame arriving while another one is being processed is dropped.
    pub fn detect(&self, frame: &E::Input) {
        self.run_frame(|session| {
            let now = Instant::now();
            let output = session.engine.inference(frame);
            session.infer_time.add_or_push(STAGE_INFERENCE, now.elapsed());
            output
        });
    }

    /// Runs the pipeline on an output tensor the caller already has.
    pub fn detect_tensor(&self, output: &[f32]) {
        self.run_frame(|_| Ok(X::from(output.to_vec())));
    }

    fn run_frame<F>(&self, infer: F)
    where
        F: FnOnce(&mut DetectorSession<E>) -> anyhow::Result<X>,
    {
        let mut guard = match self.session.try_lock() {
            Some(guard) => guard,
            None => {
                log::trace!("Detector busy, frame dropped");
                return;
            }
        };
        let session = match guard.as_mut() {
            Some(session) => session,
            None => {
                log::debug!("Detector is not set up, frame ignored");
                return;
            }
        };

        let detect_time = Instant::now();
        // One read per frame, so the whole frame sees the same threshold.
        let threshold = self.threshold.get();

        let result = infer(session).and_then(|output| {
            detection_processing::process_predictions(&output, &session.layout, &session.labels,
                                                      threshold, &mut session.infer_time)
        });

        match result {
            Ok(None) => self.listener.on_empty_detect(),
            Ok(Some(boxes)) => self.listener.on_detect(&boxes, detect_time.elapsed()),
            Err(err) => log::error!("Failed to process frame: {:#}", err),
        }
    }

    /// Average time of each stage (inference, decode + filter, suppression) since setup.
    pub fn average_stage_times(&self) -> Vec<(&'static str, Option<Duration>)> {
        let guard = self.session.lock();
        let timings = match guard.as_ref() {
            Some(session) => &session.infer_time,
            None => return Vec::new(),
        };
        vec![
            ("inference", timings.avg_i(STAGE_INFERENCE)),
            ("decode", timings.avg_i(STAGE_DECODE)),
            ("nms", timings.avg_i(STAGE_NMS)),
        ]
    }

    /// Tears the detector down, releasing the engine. Later frames are ignored.
    pub fn clear(&self) {
        if let Some(session) = self.session.lock().take() {
            log::info!("Detector cleared after {:?} of inference", session.infer_time.total());
        }
    }
}

/// Feeds frames from a keep-only-latest queue to the detector until every sender is dropped.
pub fn detector_worker<E: InferenceProcess>(detector: Arc<Detector<E>>, frames: FrameReceiver<E::Input>) {
    while let Some(frame) = frames.recv() {
        detector.detect(&frame);
    }
    log::debug!("Frame source closed, detector worker stopping");
}
