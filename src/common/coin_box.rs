use serde::{Deserialize, Serialize};
use crate::detection_runners::nms::Nms;

/// A labeled detection in normalized image coordinates.
///
/// Built once per surviving anchor by the confidence filter and never mutated afterwards.
/// `w` and `h` are the values the model predicted, so `x2 - x1` may differ from `w` by
/// floating point rounding. Areas always come from `w * h`.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    pub confidence: f32,
    pub class_index: usize,
    pub class_name: String,
}

impl Nms for CoinBox {
    /// Computes the intersection over union (IoU) between this box and another.
    ///
    /// Degenerate boxes (zero or negative union) have an IoU of 0.
    fn iou(&self, other: &Self) -> f32 {
        let union = self.union(other);
        if union <= 0. || !union.is_finite() {
            return 0.;
        }
        let iou = self.intersect(other) / union;
        if iou.is_finite() { iou } else { 0. }
    }

    /// Returns the confidence score of the box.
    fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl CoinBox {
    /// Builds a box from the model's `(cx, cy, w, h)` prediction.
    ///
    /// # Arguments
    ///
    /// * `cx` - The x-coordinate of the horizontal center.
    /// * `cy` - The y-coordinate of the vertical center.
    /// * `w` - The width of the bounding box.
    /// * `h` - The height of the bounding box.
    ///
    /// # Returns
    ///
    /// A `CoinBox` with corners derived from the center and size.
    pub fn from_cxcy_wh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x1: cx - (w / 2.0),
            y1: cy - (h / 2.0),
            x2: cx + (w / 2.0),
            y2: cy + (h / 2.0),
            cx,
            cy,
            w,
            h,
            ..Default::default()
        }
    }

    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    pub fn with_class(mut self, class_index: usize, class_name: &str) -> Self {
        self.class_index = class_index;
        self.class_name = class_name.to_string();
        self
    }

    /// Returns the bounding box coordinates as `(x1, y1, x2, y2)`.
    pub fn xy1_xy2(&self) -> (f32, f32, f32, f32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Returns the center coordinates and size of the bounding box as `(cx, cy, w, h)`.
    pub fn cxy_wh(&self) -> (f32, f32, f32, f32) {
        (self.cx, self.cy, self.w, self.h)
    }

    /// Computes the area of the bounding box from its stored width and height.
    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Computes the intersection area between this bounding box and another, using corners.
    pub fn intersect(&self, other: &CoinBox) -> f32 {
        let left = self.x1.max(other.x1);
        let top = self.y1.max(other.y1);
        let right = self.x2.min(other.x2);
        let bottom = self.y2.min(other.y2);
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &CoinBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    /// Average of width and height, used as the apparent diameter of a round coin.
    pub fn detected_diameter(&self) -> f32 {
        (self.w + self.h) / 2.
    }

    /// True when all four corners lie inside the unit square and are not inverted
    /// (`x1 <= x2`, `y1 <= y2`).
    pub fn is_normalized(&self) -> bool {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        in_unit(self.x1) && in_unit(self.y1) && in_unit(self.x2) && in_unit(self.y2)
            && self.x1 <= self.x2 && self.y1 <= self.y2
    }
}
