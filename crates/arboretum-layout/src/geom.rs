use serde::{Deserialize, Serialize};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
/// Axis-aligned rectangle stored as `(x0, y0)`–`(x1, y1)` corners, the treemap's native form.
pub type Tile = euclid::Box2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn tile(x0: f64, y0: f64, x1: f64, y1: f64) -> Tile {
    Tile::new(point(x0, y0), point(x1, y1))
}

/// Inclusive containment on every edge. Zero-area tiles on the boundary count as inside.
pub fn tile_contains(outer: &Tile, inner: &Tile) -> bool {
    inner.min.x >= outer.min.x
        && inner.max.x <= outer.max.x
        && inner.min.y >= outer.min.y
        && inner.max.y <= outer.max.y
}

/// An SVG-style `viewBox`: origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewFrame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Continuous linear map from a domain interval onto a range interval.
///
/// A degenerate domain maps everything to the middle of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn set_domain(&mut self, domain: (f64, f64)) {
        self.domain = domain;
    }

    pub fn set_range(&mut self, range: (f64, f64)) {
        self.range = range;
    }

    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span != 0.0 { (v - d0) / span } else { 0.5 };
        r0 + (r1 - r0) * t
    }
}

/// The data-space rectangle currently mapped onto the treemap viewport.
///
/// Zooming only changes the scale domains; the underlying treemap layout is not recomputed.
/// Mapped coordinates are not rounded, so zoomed tiles keep fractional edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomWindow {
    x: LinearScale,
    y: LinearScale,
}

impl ZoomWindow {
    /// Identity window over a `width` × `height` layout.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: LinearScale::new((0.0, width), (0.0, width)),
            y: LinearScale::new((0.0, height), (0.0, height)),
        }
    }

    pub fn set_domain(&mut self, domain: Tile) {
        self.x.set_domain((domain.min.x, domain.max.x));
        self.y.set_domain((domain.min.y, domain.max.y));
    }

    pub fn domain(&self) -> Tile {
        let (x0, x1) = self.x.domain();
        let (y0, y1) = self.y.domain();
        tile(x0, y0, x1, y1)
    }

    /// Resizes the output range, keeping the current domain.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.x.set_range((0.0, width));
        self.y.set_range((0.0, height));
    }

    pub fn contains(&self, t: &Tile) -> bool {
        tile_contains(&self.domain(), t)
    }

    pub fn map_point(&self, p: Point) -> Point {
        point(self.x.map(p.x), self.y.map(p.y))
    }

    pub fn map(&self, t: &Tile) -> Tile {
        Tile::new(self.map_point(t.min), self.map_point(t.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_scale_maps_between_intervals() {
        let s = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        assert_eq!(s.map(2.5), 25.0);
        let r = LinearScale::new((0.0, 3.0), (0.0, 10.0));
        assert!((r.map(1.0) - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_domain_maps_to_range_midpoint() {
        let s = LinearScale::new((4.0, 4.0), (0.0, 100.0));
        assert_eq!(s.map(4.0), 50.0);
        assert_eq!(s.map(-7.0), 50.0);
    }

    #[test]
    fn zoom_window_maps_domain_onto_full_range() {
        let mut w = ZoomWindow::new(200.0, 100.0);
        w.set_domain(tile(50.0, 0.0, 100.0, 50.0));
        let mapped = w.map(&tile(50.0, 0.0, 100.0, 50.0));
        assert_eq!(mapped, tile(0.0, 0.0, 200.0, 100.0));
        assert!(w.contains(&tile(60.0, 10.0, 100.0, 50.0)));
        assert!(!w.contains(&tile(40.0, 10.0, 60.0, 20.0)));
    }

    #[test]
    fn zoomed_tiles_keep_fractional_edges() {
        let mut w = ZoomWindow::new(100.0, 100.0);
        w.set_domain(tile(0.0, 0.0, 30.0, 30.0));
        let mapped = w.map(&tile(0.0, 0.0, 10.0, 20.0));
        assert!((mapped.max.x - 100.0 / 3.0).abs() < 1e-9);
        assert!((mapped.max.y - 200.0 / 3.0).abs() < 1e-9);
        assert_ne!(mapped.max.x, mapped.max.x.round());
    }
}
