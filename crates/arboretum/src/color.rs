use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_u32(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Linear interpolation per channel, rounded.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let ch = |a: u8, b: u8| {
            (a as f64 + (b as f64 - a as f64) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb::new(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fill for the dataset root and the treemap header band.
pub const NEUTRAL: Rgb = Rgb::from_u32(0xcccccc);
pub const BLACK: Rgb = Rgb::from_u32(0x000000);
pub const WHITE: Rgb = Rgb::from_u32(0xffffff);

/// Maps an aggregate value to a fill color.
pub trait ColorScale {
    fn color(&self, value: f64) -> Rgb;
    fn domain(&self) -> (f64, f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Blues,
    Greens,
    Greys,
    Oranges,
    Purples,
    Reds,
}

impl Palette {
    pub const ALL: [Palette; 6] = [
        Palette::Blues,
        Palette::Greens,
        Palette::Greys,
        Palette::Oranges,
        Palette::Purples,
        Palette::Reds,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Palette::Blues => "blues",
            Palette::Greens => "greens",
            Palette::Greys => "greys",
            Palette::Oranges => "oranges",
            Palette::Purples => "purples",
            Palette::Reds => "reds",
        }
    }

    /// Nine-class sequential ColorBrewer stops, light to dark.
    pub fn stops(self) -> [Rgb; 9] {
        let hex = match self {
            Palette::Blues => [
                0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
                0x08306b,
            ],
            Palette::Greens => [
                0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
                0x00441b,
            ],
            Palette::Greys => [
                0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
                0x000000,
            ],
            Palette::Oranges => [
                0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603,
                0x7f2704,
            ],
            Palette::Purples => [
                0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f,
                0x3f007d,
            ],
            Palette::Reds => [
                0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
                0x67000d,
            ],
        };
        hex.map(Rgb::from_u32)
    }
}

/// Piecewise-linear ramp over a palette's stops, clamped to its domain.
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialScale {
    palette: Palette,
    domain: (f64, f64),
}

impl SequentialScale {
    pub fn new(palette: Palette, domain: (f64, f64)) -> Self {
        Self { palette, domain }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Extends the domain outward to round tick steps (about ten ticks).
    #[must_use]
    pub fn nice(mut self) -> Self {
        self.domain = nice_domain(self.domain, 10);
        self
    }

    fn normalize(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        if d1 == d0 || !value.is_finite() {
            return 0.0;
        }
        ((value - d0) / (d1 - d0)).clamp(0.0, 1.0)
    }
}

impl ColorScale for SequentialScale {
    fn color(&self, value: f64) -> Rgb {
        let stops = self.palette.stops();
        let scaled = self.normalize(value) * (stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        stops[i].mix(stops[i + 1], scaled - i as f64)
    }

    fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

fn nice_domain(domain: (f64, f64), count: usize) -> (f64, f64) {
    let (mut start, mut stop) = domain;
    if !(start.is_finite() && stop.is_finite()) || start == stop {
        return domain;
    }
    let reversed = stop < start;
    if reversed {
        std::mem::swap(&mut start, &mut stop);
    }
    let mut prestep = f64::NAN;
    for _ in 0..10 {
        let step = tick_increment(start, stop, count);
        if step == prestep {
            break;
        } else if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else if step < 0.0 {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        } else {
            break;
        }
        prestep = step;
    }
    if reversed { (stop, start) } else { (start, stop) }
}
