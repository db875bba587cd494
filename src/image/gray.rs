//! Owned single-channel 8-bit image in row-major layout (stride == width).
//!
//! Every pipeline stage consumes and produces this type; the `image` crate
//! only appears at the I/O boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order, `w * h` bytes
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0u8; w * h],
        }
    }

    /// Wrap raw bytes; `data.len()` must equal `w * h`.
    pub fn from_raw(w: usize, h: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), w * h);
        Self { w, h, data }
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.w + x]
    }

    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    /// Borrow row `y` as a slice of `w` bytes.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.w;
        let end = start + self.w;
        &mut self.data[start..end]
    }

    /// Copy out the sub-image `[x0, x0+cw) × [y0, y0+ch)`.
    /// The box must lie inside the image.
    pub fn crop(&self, x0: usize, y0: usize, cw: usize, ch: usize) -> Self {
        debug_assert!(x0 + cw <= self.w && y0 + ch <= self.h);
        let mut out = Self::new(cw, ch);
        for y in 0..ch {
            let src = (y0 + y) * self.w + x0;
            out.row_mut(y).copy_from_slice(&self.data[src..src + cw]);
        }
        out
    }

    /// Minimum and maximum pixel value, or `None` for an empty image.
    pub fn min_max(&self) -> Option<(u8, u8)> {
        let mut it = self.data.iter();
        let first = *it.next()?;
        let mut lo = first;
        let mut hi = first;
        for &v in it {
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
        Some((lo, hi))
    }
}
