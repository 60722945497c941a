use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use coin_detect::common::CoinBox;
use coin_detect::data::X;
use coin_detect::detection_processing::{decode_predictions, filter_candidates};
use coin_detect::detection_runners::{nms, Nms, IOU_THRESHOLD};

use tensors::*;

fn random_box(rng: &mut StdRng) -> CoinBox {
    let w = rng.gen_range(0.01f32..0.4);
    let h = rng.gen_range(0.01f32..0.4);
    let cx = rng.gen_range(w / 2. ..1. - w / 2.);
    let cy = rng.gen_range(h / 2. ..1. - h / 2.);
    CoinBox::from_cxcy_wh(cx, cy, w, h)
        .with_confidence(rng.gen_range(0.0f32..1.0))
        .with_class(rng.gen_range(0..LABELS.len()), "$1")
}

fn random_anchors(rng: &mut StdRng, n: usize) -> Vec<Anchor> {
    (0..n)
        .map(|_| {
            anchor(
                rng.gen_range(0.0f32..1.0),
                rng.gen_range(0.0f32..1.0),
                rng.gen_range(-0.2f32..0.5),
                rng.gen_range(-0.2f32..0.5),
                rng.gen_range(0..LABELS.len()),
                rng.gen_range(0.02f32..1.0),
            )
        })
        .collect()
}

#[test]
fn iou_is_symmetric_and_bounded() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..2000 {
        let a = random_box(&mut rng);
        let b = random_box(&mut rng);
        let ab = a.iou(&b);
        assert_abs_diff_eq!(ab, b.iou(&a), epsilon = 1e-6);
        assert!(ab >= 0. && ab <= 1. + 1e-4, "iou {ab} out of bounds");
        assert_abs_diff_eq!(a.iou(&a), 1., epsilon = 1e-4);
    }
}

#[test]
fn degenerate_boxes_have_zero_iou() {
    let point = CoinBox::from_cxcy_wh(0.5, 0.5, 0., 0.);
    let line = CoinBox::from_cxcy_wh(0.5, 0.5, 0.2, 0.);
    let normal = CoinBox::from_cxcy_wh(0.5, 0.5, 0.2, 0.2);

    assert_eq!(point.iou(&point), 0.);
    assert_eq!(line.iou(&point), 0.);
    assert_eq!(point.iou(&normal), 0.);
}

#[test]
fn area_uses_stored_size() {
    let mut b = CoinBox::from_cxcy_wh(0.5, 0.5, 0.2, 0.2);
    b.w = 0.4;

    assert_abs_diff_eq!(b.area(), 0.08, epsilon = 1e-7);
    assert_abs_diff_eq!(b.intersect(&b), 0.04, epsilon = 1e-7);
}

#[test]
fn nms_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let n = rng.gen_range(1..60);
        let mut boxes: Vec<CoinBox> = (0..n).map(|_| random_box(&mut rng)).collect();
        nms(&mut boxes, IOU_THRESHOLD);

        let mut again = boxes.clone();
        nms(&mut again, IOU_THRESHOLD);

        assert_eq!(again, boxes);
    }
}

#[test]
fn nms_only_removes_and_leaves_no_overlap() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..200 {
        let n = rng.gen_range(1..60);
        let original: Vec<CoinBox> = (0..n).map(|_| random_box(&mut rng)).collect();
        let mut kept = original.clone();
        nms(&mut kept, IOU_THRESHOLD);

        assert!(!kept.is_empty() && kept.len() <= original.len());
        assert!(kept.iter().all(|k| original.contains(k)));
        assert!(kept.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(a.iou(b) < IOU_THRESHOLD);
            }
        }
    }
}

#[test]
fn raising_threshold_never_adds_boxes() {
    let mut rng = StdRng::seed_from_u64(17);
    let n = 300;
    let flat = tensor(&random_anchors(&mut rng, n));
    let candidates = decode_predictions(&X::from(flat), &layout(n)).unwrap();

    let mut previous = filter_candidates(&candidates, -0.1, &labels());
    for step in 0..=20 {
        let threshold = step as f32 * 0.05;
        let current = filter_candidates(&candidates, threshold, &labels());
        assert!(current.len() <= previous.len());
        assert!(current.iter().all(|b| previous.contains(b)));
        previous = current;
    }
    assert!(previous.is_empty());
}

#[test]
fn survivors_lie_inside_the_frame() {
    let mut rng = StdRng::seed_from_u64(19);
    let n = 500;
    let flat = tensor(&random_anchors(&mut rng, n));
    let candidates = decode_predictions(&X::from(flat), &layout(n)).unwrap();

    let boxes = filter_candidates(&candidates, 0.1, &labels());

    assert!(!boxes.is_empty());
    for b in &boxes {
        assert!(0. <= b.x1 && b.x1 <= b.x2 && b.x2 <= 1.);
        assert!(0. <= b.y1 && b.y1 <= b.y2 && b.y2 <= 1.);
    }
}
