use crate::model::{Conference, Metric, MixShare};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| f64::from(b).mul_add(t, f64::from(a) * (1.0 - t)).round() as u8;
        Self(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }

    pub fn css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Yellow-orange-red, light to dark.
const YL_OR_RD: [u32; 9] = [
    0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026, 0x800026,
];

/// Sequential color scale over a numeric domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialScale {
    domain: (f64, f64),
}

impl SequentialScale {
    pub const fn new(domain: (f64, f64)) -> Self {
        Self { domain }
    }

    pub fn map(&self, value: f64) -> Rgb {
        let (d0, d1) = self.domain;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        interpolate(&YL_OR_RD, t)
    }
}

fn interpolate(stops: &[u32], t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let last = stops.len() - 1;
    let scaled = t * last as f64;
    let index = (scaled.floor() as usize).min(last.saturating_sub(1));
    let local = scaled - index as f64;
    Rgb::from_hex(stops[index]).lerp(Rgb::from_hex(stops[(index + 1).min(last)]), local)
}

pub const fn metric_color(metric: Metric) -> &'static str {
    match metric {
        Metric::AvgThreeAttempts => "#f97316",
        Metric::AvgPoints => "#38bdf8",
        Metric::AvgThreeRate => "#a3e635",
    }
}

pub const fn share_color(share: MixShare) -> &'static str {
    match share {
        MixShare::Two => "#64748b",
        MixShare::Three => "#f97316",
        MixShare::FreeThrow => "#38bdf8",
    }
}

pub const fn conference_color(conference: Option<Conference>) -> &'static str {
    match conference {
        Some(Conference::East) => "#38bdf8",
        Some(Conference::West) => "#f97316",
        None => "#94a3b8",
    }
}
