//! External boundary contours of binary masks and their geometry.
//!
//! Components are gathered with an 8-connected flood, their outer boundary
//! traced with Moore neighbor tracing, and the polygon metrics (shoelace
//! area, closed perimeter, moment centroid, convex-hull solidity) computed
//! from the traced polygon, so the numbers match what a polygon-based
//! contour toolkit reports rather than raw pixel counts.

use crate::image::GrayImage;
use nalgebra::Point2;

/// One external contour candidate.
#[derive(Clone, Debug)]
pub struct Contour {
    /// Ordered boundary pixels.
    pub points: Vec<Point2<f64>>,
    /// Shoelace area of the boundary polygon.
    pub area: f64,
    /// Closed boundary length.
    pub perimeter: f64,
    /// Polygon-moment centroid (vertex mean for degenerate areas).
    pub centroid: Point2<f64>,
    /// Area divided by convex-hull area.
    pub solidity: f64,
}

/// Axis-aligned integer bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Contour {
    fn from_points(points: Vec<Point2<f64>>) -> Self {
        let area = polygon_area(&points);
        let perimeter = polygon_perimeter(&points);
        let centroid = polygon_centroid(&points, area);
        let hull = convex_hull(&points);
        let hull_area = polygon_area(&hull).max(1e-6);
        let solidity = area / hull_area;
        Self {
            points,
            area,
            perimeter,
            centroid,
            solidity,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        BoundingBox {
            x: min_x as usize,
            y: min_y as usize,
            w: (max_x - min_x) as usize + 1,
            h: (max_y - min_y) as usize + 1,
        }
    }
}

/// Extract the external boundary of every 8-connected foreground component.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    let (w, h) = (mask.w, mask.h);
    let mut labels = vec![0u32; w * h];
    let mut contours = Vec::new();
    let mut next_label = 1u32;
    let mut stack = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if mask.data[idx] == 0 || labels[idx] != 0 {
                continue;
            }
            // label the whole component, remembering its first (top-left)
            // pixel as the trace start
            let label = next_label;
            next_label += 1;
            labels[idx] = label;
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                for dy in -1isize..=1 {
                    for dx in -1isize..=1 {
                        let nx = cx as isize + dx;
                        let ny = cy as isize + dy;
                        if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                            continue;
                        }
                        let nidx = ny as usize * w + nx as usize;
                        if mask.data[nidx] != 0 && labels[nidx] == 0 {
                            labels[nidx] = label;
                            stack.push((nx as usize, ny as usize));
                        }
                    }
                }
            }
            let boundary = trace_boundary(mask, x, y);
            contours.push(Contour::from_points(boundary));
        }
    }
    contours
}

// Moore neighborhood in clockwise order starting east.
const MOORE: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Moore-neighbor boundary trace from the component's top-left pixel.
fn trace_boundary(mask: &GrayImage, start_x: usize, start_y: usize) -> Vec<Point2<f64>> {
    let (w, h) = (mask.w as isize, mask.h as isize);
    let is_fg = |x: isize, y: isize| -> bool {
        x >= 0 && y >= 0 && x < w && y < h && mask.get(x as usize, y as usize) != 0
    };

    let start = (start_x as isize, start_y as isize);
    let mut points = vec![Point2::new(start.0 as f64, start.1 as f64)];
    // entered the start pixel moving east; begin scanning from its west side
    let mut current = start;
    let mut dir = 4usize;

    loop {
        let mut found = None;
        for step in 1..=8usize {
            let probe = (dir + step) % 8;
            let (dx, dy) = MOORE[probe];
            let nx = current.0 + dx;
            let ny = current.1 + dy;
            if is_fg(nx, ny) {
                found = Some(((nx, ny), probe));
                break;
            }
        }
        let Some((next, probe)) = found else {
            break; // isolated pixel
        };
        if next == start && points.len() > 1 {
            break;
        }
        points.push(Point2::new(next.0 as f64, next.1 as f64));
        // back up two octants from the direction we came in
        dir = (probe + 6) % 8;
        current = next;
        if points.len() > (mask.w * mask.h * 4).max(16) {
            break; // safety bound, never hit on well-formed masks
        }
    }
    points
}

/// Signed shoelace area, absolute value.
pub fn polygon_area(points: &[Point2<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        acc += a.x * b.y - b.x * a.y;
    }
    (acc / 2.0).abs()
}

/// Closed polyline length.
pub fn polygon_perimeter(points: &[Point2<f64>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        acc += (b - a).norm();
    }
    acc
}

/// Centroid via polygon moments; falls back to the vertex mean when the
/// signed area degenerates (collinear boundaries).
pub fn polygon_centroid(points: &[Point2<f64>], area_hint: f64) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    if area_hint > 1e-9 && points.len() >= 3 {
        let mut signed = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            let cross = a.x * b.y - b.x * a.y;
            signed += cross;
            cx += (a.x + b.x) * cross;
            cy += (a.y + b.y) * cross;
        }
        if signed.abs() > 1e-12 {
            return Point2::new(cx / (3.0 * signed), cy / (3.0 * signed));
        }
    }
    let n = points.len() as f64;
    let sum = points
        .iter()
        .fold(Point2::origin(), |acc: Point2<f64>, p| {
            Point2::new(acc.x + p.x, acc.y + p.y)
        });
    Point2::new(sum.x / n, sum.y / n)
}

/// Convex hull via Andrew's monotone chain.
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts: Vec<Point2<f64>> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup_by(|a, b| a.x == b.x && a.y == b.y);
    if pts.len() < 3 {
        return pts;
    }
    let cross = |o: Point2<f64>, a: Point2<f64>, b: Point2<f64>| -> f64 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };
    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(pts.len() * 2);
    for &p in pts.iter().chain(pts.iter().rev().skip(1)) {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Rasterize the filled contour polygon (boundary inclusive) as a 0/255 mask.
pub fn fill_contour_mask(contour: &Contour, w: usize, h: usize) -> GrayImage {
    let mut mask = GrayImage::new(w, h);
    let pts = &contour.points;
    if pts.is_empty() {
        return mask;
    }
    // even-odd scanline fill
    for y in 0..h {
        let yc = y as f64;
        let mut xs: Vec<f64> = Vec::new();
        for i in 0..pts.len() {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            if (a.y <= yc && b.y > yc) || (b.y <= yc && a.y > yc) {
                let t = (yc - a.y) / (b.y - a.y);
                xs.push(a.x + t * (b.x - a.x));
            }
        }
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for pair in xs.chunks(2) {
            if let [xa, xb] = pair {
                let x0 = xa.ceil().max(0.0) as isize;
                let x1 = (xb.floor()).min(w as f64 - 1.0) as isize;
                for x in x0..=x1 {
                    if x >= 0 {
                        mask.set(x as usize, y, 255);
                    }
                }
            }
        }
    }
    // boundary pixels are always inside
    for p in pts {
        let (x, y) = (p.x as usize, p.y as usize);
        if x < w && y < h {
            mask.set(x, y, 255);
        }
    }
    mask
}
