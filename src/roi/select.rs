//! Candidate filtering and contour selection strategies.
//!
//! Selection is a pure function over the filtered candidate list, keyed by
//! [`SelectionMode`]; the composite-score math lives here, isolated from
//! the mask/boundary logic. Ties resolve to the first-encountered
//! candidate.

use super::contour::Contour;
use super::options::{RoiOptions, SelectionMode};

/// True when the centroid lies inside the central window (`pct` of each
/// dimension, centred). A window of 0 disables the filter.
pub fn in_central_window(cx: f64, cy: f64, w: usize, h: usize, pct: f64) -> bool {
    if pct <= 0.0 {
        return true;
    }
    let x0 = w as f64 * (100.0 - pct) / 200.0;
    let y0 = h as f64 * (100.0 - pct) / 200.0;
    (x0..=w as f64 - x0).contains(&cx) && (y0..=h as f64 - y0).contains(&cy)
}

/// Filter by area window and centrality, then pick per the selection mode.
/// Returns an index into `contours`.
pub fn select_contour(
    contours: &[Contour],
    w: usize,
    h: usize,
    opts: &RoiOptions,
) -> Option<usize> {
    let region_area = (w * h) as f64;
    let min_area = opts.min_area_pct / 100.0 * region_area;
    let max_area = opts.max_area_pct / 100.0 * region_area;

    let candidates: Vec<usize> = (0..contours.len())
        .filter(|&i| {
            let c = &contours[i];
            c.area >= min_area
                && c.area <= max_area
                && in_central_window(c.centroid.x, c.centroid.y, w, h, opts.central_window_pct)
        })
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let argmax = |key: &dyn Fn(&Contour) -> f64| -> usize {
        let mut best = candidates[0];
        let mut best_key = key(&contours[best]);
        for &i in &candidates[1..] {
            let k = key(&contours[i]);
            if k > best_key {
                best = i;
                best_key = k;
            }
        }
        best
    };

    let center_x = w as f64 / 2.0;
    let center_y = h as f64 / 2.0;
    let diag = (w as f64).hypot(h as f64);
    let norm_dist = |c: &Contour| -> f64 {
        (c.centroid.x - center_x).hypot(c.centroid.y - center_y) / (diag + 1e-6)
    };

    let picked = match opts.selection {
        SelectionMode::MaxArea => argmax(&|c| c.area),
        SelectionMode::MaxPerimeter => argmax(&|c| c.perimeter),
        SelectionMode::MinCenterDist => argmax(&|c| -norm_dist(c)),
        SelectionMode::MaxSolidity => argmax(&|c| c.solidity),
        SelectionMode::Composite => {
            let max_area = candidates
                .iter()
                .map(|&i| contours[i].area)
                .fold(0.0f64, f64::max);
            let max_perim = candidates
                .iter()
                .map(|&i| contours[i].perimeter)
                .fold(0.0f64, f64::max);
            let w_area = opts.w_area / 100.0;
            let w_len = opts.w_length / 100.0;
            let w_sol = opts.w_solidity / 100.0;
            let w_center = opts.w_center / 100.0;
            argmax(&|c| {
                w_area * c.area / (max_area + 1e-6) + w_len * c.perimeter / (max_perim + 1e-6)
                    + w_sol * c.solidity
                    - w_center * (opts.central_bias / 50.0) * norm_dist(c)
            })
        }
    };
    Some(picked)
}
