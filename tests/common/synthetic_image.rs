use osteoage::image::GrayImage;

/// Generates a hand-like bright blob (palm disc plus finger bars) on a dark
/// background, centred in the frame.
pub fn synthetic_hand(width: usize, height: usize) -> GrayImage {
    assert!(width >= 64 && height >= 64, "image too small for the blob");

    let mut img = GrayImage::new(width, height);
    let cx = width as f64 / 2.0;
    let cy = height as f64 * 0.62;
    let palm_r = width.min(height) as f64 * 0.18;

    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            if (dx * dx + dy * dy).sqrt() <= palm_r {
                img.set(x, y, 210);
            }
        }
    }

    // five finger bars fanning up from the palm
    let finger_w = (width / 24).max(2);
    let finger_h = (height as f64 * 0.30) as usize;
    let top = (cy - palm_r) as usize;
    for i in 0..5 {
        let offset = (i as isize - 2) * (palm_r * 0.45) as isize;
        let fx = (cx as isize + offset - finger_w as isize / 2).max(0) as usize;
        let fy = top.saturating_sub(finger_h);
        for y in fy..top + 4 {
            for x in fx..(fx + finger_w).min(width) {
                img.set(x, y, 200);
            }
        }
    }
    img
}
