//! ROI extraction: locate the hand region and mask out background.
//!
//! Fixed pipeline: border-margin discard → min-max normalize → one denoise
//! filter → binarize → morphological cleanup → external contours →
//! area/centrality filter → strategy-scored selection → bounding-box crop
//! with optional polygon masking. Finding no acceptable contour is a
//! reported skip, not an error; the caller keeps its pre-stage image.

pub mod contour;
pub mod filters;
pub mod morphology;
pub mod options;
pub mod select;
pub mod threshold;
#[cfg(test)]
mod tests;

pub use self::contour::{BoundingBox, Contour};
pub use self::options::{Denoise, Morphology, RoiOptions, SelectionMode, Threshold};

use crate::image::GrayImage;
use log::debug;

/// Outcome of one extraction attempt.
#[derive(Clone, Debug)]
pub enum RoiOutcome {
    /// The cropped (and optionally masked) region.
    Extracted(GrayImage),
    /// The cleaned mask produced no contours at all.
    NoContour,
    /// Contours existed but none survived the area/centrality filters.
    NoValidContour,
}

impl RoiOutcome {
    /// Stage reason code for logs and reports.
    pub fn reason(&self) -> &'static str {
        match self {
            RoiOutcome::Extracted(_) => "ok",
            RoiOutcome::NoContour => "no_contour",
            RoiOutcome::NoValidContour => "no_valid_contour",
        }
    }
}

/// Run the full extraction pipeline on a grayscale image.
pub fn extract_roi(gray: &GrayImage, opts: &RoiOptions) -> RoiOutcome {
    let (full_w, full_h) = (gray.w, gray.h);
    if full_w == 0 || full_h == 0 {
        return RoiOutcome::NoContour;
    }

    // 1. discard the configured border margin unless it would swallow half
    //    of either dimension
    let ph = (full_h as f64 * opts.margin_pct / 100.0) as usize;
    let pw = (full_w as f64 * opts.margin_pct / 100.0) as usize;
    let region = if ph * 2 >= full_h || pw * 2 >= full_w {
        gray.clone()
    } else {
        gray.crop(pw, ph, full_w - 2 * pw, full_h - 2 * ph)
    };
    let (w, h) = (region.w, region.h);

    // 2–5. normalize, denoise, binarize, clean
    let mut work = region.clone();
    filters::normalize_min_max(&mut work);
    let work = filters::denoise(&work, opts.denoise);
    let mask = threshold::binarize(&work, opts.threshold, opts.invert);
    let mask = morphology::apply_morphology(&mask, &opts.morphology);

    // 6–8. contours, filter, select
    let contours = contour::find_external_contours(&mask);
    if contours.is_empty() {
        debug!("extract_roi: no contours in cleaned mask ({w}x{h})");
        return RoiOutcome::NoContour;
    }
    let Some(best) = select::select_contour(&contours, w, h, opts) else {
        debug!(
            "extract_roi: {} contours, none passed area/centrality filters",
            contours.len()
        );
        return RoiOutcome::NoValidContour;
    };
    let winner = &contours[best];
    debug!(
        "extract_roi: selected contour area={:.1} perimeter={:.1} solidity={:.3}",
        winner.area, winner.perimeter, winner.solidity
    );

    // 9. crop to the expanded bounding box, optionally mask outside pixels
    let bb = winner.bounding_box();
    let margin = opts.crop_margin;
    let bx = bb.x.saturating_sub(margin);
    let by = bb.y.saturating_sub(margin);
    let bw = (bb.w + 2 * margin).min(w - bx);
    let bh = (bb.h + 2 * margin).min(h - by);

    let mut crop = region.crop(bx, by, bw, bh);
    if opts.apply_mask {
        let poly_mask = contour::fill_contour_mask(winner, w, h);
        for y in 0..bh {
            for x in 0..bw {
                if poly_mask.get(bx + x, by + y) == 0 {
                    crop.set(x, y, 0);
                }
            }
        }
    }
    RoiOutcome::Extracted(crop)
}
