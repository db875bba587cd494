use super::options::{Denoise, Morphology, RoiOptions, SelectionMode, Threshold};
use super::{extract_roi, RoiOutcome};
use crate::image::GrayImage;

fn blob_image(size: usize, x0: usize, y0: usize, side: usize, value: u8) -> GrayImage {
    let mut img = GrayImage::new(size, size);
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            img.set(x, y, value);
        }
    }
    img
}

fn plain_options() -> RoiOptions {
    RoiOptions {
        margin_pct: 10.0,
        denoise: Denoise::Gaussian { k: 3 },
        threshold: Threshold::Global { t: 128 },
        invert: false,
        morphology: Morphology {
            open_k: 0,
            close_k: 0,
            erode_k: 0,
            dilate_k: 0,
            iterations: 1,
            fill_holes: false,
        },
        min_area_pct: 5.0,
        max_area_pct: 100.0,
        central_window_pct: 0.0,
        selection: SelectionMode::MaxArea,
        crop_margin: 0,
        apply_mask: false,
        ..RoiOptions::default()
    }
}

#[test]
fn bright_blob_is_extracted_to_its_bounding_box() {
    let img = blob_image(60, 20, 20, 20, 200);
    let outcome = extract_roi(&img, &plain_options());
    let RoiOutcome::Extracted(crop) = outcome else {
        panic!("expected extraction, got {}", outcome.reason());
    };
    // gaussian blur bleeds one pixel beyond the square on each side
    assert!((19..=24).contains(&crop.w), "crop width {}", crop.w);
    assert!((19..=24).contains(&crop.h), "crop height {}", crop.h);
    // the crop keeps the original (pre-normalization) pixel values
    let center = crop.get(crop.w / 2, crop.h / 2);
    assert_eq!(center, 200, "centre value {center}");
}

#[test]
fn flat_image_reports_no_contour() {
    let img = GrayImage::from_raw(48, 48, vec![17u8; 48 * 48]);
    let outcome = extract_roi(&img, &plain_options());
    assert!(matches!(outcome, RoiOutcome::NoContour));
    assert_eq!(outcome.reason(), "no_contour");
}

#[test]
fn area_filter_failure_reports_no_valid_contour() {
    let img = blob_image(60, 20, 20, 20, 200);
    let mut opts = plain_options();
    opts.min_area_pct = 90.0;
    let outcome = extract_roi(&img, &opts);
    assert!(matches!(outcome, RoiOutcome::NoValidContour));
    assert_eq!(outcome.reason(), "no_valid_contour");
}

#[test]
fn crop_margin_expands_the_box() {
    let img = blob_image(60, 24, 24, 12, 220);
    let mut opts = plain_options();
    opts.crop_margin = 4;
    let RoiOutcome::Extracted(with_margin) = extract_roi(&img, &opts) else {
        panic!("expected extraction");
    };
    opts.crop_margin = 0;
    let RoiOutcome::Extracted(tight) = extract_roi(&img, &opts) else {
        panic!("expected extraction");
    };
    assert!(with_margin.w >= tight.w + 6);
    assert!(with_margin.h >= tight.h + 6);
}

#[test]
fn mask_blackens_pixels_outside_the_contour() {
    // plus-shaped blob: the bounding box corners are background
    let mut img = GrayImage::new(64, 64);
    for y in 20..44 {
        for x in 28..36 {
            img.set(x, y, 230);
            img.set(y, x, 230);
        }
    }
    let mut opts = plain_options();
    opts.denoise = Denoise::Median { k: 3 };
    opts.apply_mask = true;
    let RoiOutcome::Extracted(crop) = extract_roi(&img, &opts) else {
        panic!("expected extraction");
    };
    assert_eq!(crop.get(0, 0), 0, "bounding-box corner should be masked");
    assert!(crop.get(crop.w / 2, crop.h / 2) > 200);
}

#[test]
fn tiny_image_skips_the_border_margin() {
    // margin of 50% would swallow the whole image; extraction still runs
    let img = blob_image(12, 3, 3, 6, 255);
    let mut opts = plain_options();
    opts.margin_pct = 50.0;
    opts.min_area_pct = 1.0;
    let outcome = extract_roi(&img, &opts);
    assert!(matches!(outcome, RoiOutcome::Extracted(_)));
}
