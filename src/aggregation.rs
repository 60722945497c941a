//! Turns the boxes of one frame into an amount of money.
//!
//! Explicit denominations count at face value. The ambiguous "eagle" coin (a 1, 2 or 5 seen
//! from the side that looks the same on all three) is sized against a calibration
//! reference: the first explicit 1, 2 or 5 coin in the order the boxes come in, which
//! for pipeline output is suppression order. Without a reference the ambiguous coins
//! are skipped.

use serde::{Deserialize, Serialize};
use crate::common::coin_class::{DIAMETER_1_MM, DIAMETER_2_MM};
use crate::common::{CoinBox, CoinClass};

/// Tolerance applied to the known diameters when sizing an ambiguous coin.
pub const SIZE_FUZZ: f64 = 1.1;

/// Millimetres per normalized unit, taken from one coin of known size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Index of the reference box in the slice it was found in.
    pub reference_index: usize,
    pub known_diameter: f32,
    pub detected_diameter: f32,
}

impl Calibration {
    /// First box with an explicit 1, 2 or 5 label.
    pub fn find(boxes: &[CoinBox]) -> Option<Self> {
        boxes.iter().enumerate().find_map(|(i, b)| {
            CoinClass::from_label(&b.class_name)
                .reference_diameter()
                .map(|known_diameter| Self {
                    reference_index: i,
                    known_diameter,
                    detected_diameter: b.detected_diameter(),
                })
        })
    }

    pub fn scale(&self) -> f32 {
        self.known_diameter / self.detected_diameter
    }

    /// Estimated physical diameter of a box, in millimetres.
    pub fn real_diameter(&self, bbox: &CoinBox) -> f32 {
        bbox.detected_diameter() * self.scale()
    }

    /// Sorts an ambiguous coin into 1, 2 or 5 by its estimated size.
    pub fn classify(&self, bbox: &CoinBox) -> f32 {
        let real = self.real_diameter(bbox) as f64;
        if real < DIAMETER_1_MM as f64 * SIZE_FUZZ {
            1.
        } else if real < DIAMETER_2_MM as f64 * SIZE_FUZZ {
            2.
        } else {
            5.
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoinTally {
    pub total: f32,
    /// Value of each box, `None` for boxes that could not be valued.
    pub values: Vec<Option<f32>>,
    pub calibration: Option<Calibration>,
}

/// Values every box of a frame. Boxes are only read.
pub fn tally(boxes: &[CoinBox]) -> CoinTally {
    let calibration = Calibration::find(boxes);
    if calibration.is_none() && boxes.iter().any(|b| CoinClass::from_label(&b.class_name).is_ambiguous()) {
        log::debug!("No reference coin in frame, ambiguous coins are not counted");
    }

    let values: Vec<Option<f32>> = boxes
        .iter()
        .map(|b| match CoinClass::from_label(&b.class_name) {
            CoinClass::Known(value) => Some(value),
            CoinClass::Ambiguous => calibration.as_ref().map(|c| c.classify(b)),
            CoinClass::Unrecognized => {
                log::warn!("Label {:?} is not a denomination, not counted", b.class_name);
                None
            }
        })
        .collect();

    CoinTally {
        total: values.iter().flatten().sum(),
        values,
        calibration,
    }
}

/// Total value of the coins in a frame.
pub fn total_value(boxes: &[CoinBox]) -> f32 {
    tally(boxes).total
}
