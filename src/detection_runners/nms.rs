/// Fixed overlap at which a lower confidence box counts as a duplicate.
pub const IOU_THRESHOLD: f32 = 0.5;

pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
}

/// Greedy, class-agnostic non-maximum suppression.
///
/// Boxes are stable-sorted by confidence (highest first), then each box is kept unless a
/// box kept before it overlaps it with an IoU of at least `iou_threshold`. Kept boxes stay
/// in selection order. Running it again on its own output changes nothing.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
    boxes.sort_by(|b1, b2| b2.confidence().total_cmp(&b1.confidence()));
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou >= iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}
