//! Continuous and band scales mapping data values into chart space.

/// Smallest and largest finite values, or `None` for an empty input.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

/// Index of the value closest to `x` in an ascending slice.
///
/// Exact midpoints resolve to the upper neighbour, so repeated lookups at the
/// same position always agree.
pub fn bisect_center(sorted: &[f64], x: f64) -> Option<usize> {
    if sorted.is_empty() || !x.is_finite() {
        return None;
    }
    let upper = sorted.partition_point(|value| *value < x).min(sorted.len() - 1);
    if upper > 0 && sorted[upper] - x > x - sorted[upper - 1] {
        Some(upper - 1)
    } else {
        Some(upper)
    }
}

/// Tick step for `count` ticks over `[start, stop]`, snapped to 1, 2 or 5 × 10^k.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let span = (stop - start).abs();
    if span == 0.0 || count == 0 || !span.is_finite() {
        return 0.0;
    }
    let raw = span / count as f64;
    let power = raw.log10().floor();
    let magnitude = 10_f64.powf(power);
    let error = raw / magnitude;
    let factor = if error >= 50_f64.sqrt() {
        10.0
    } else if error >= 10_f64.sqrt() {
        5.0
    } else if error >= 2_f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * magnitude
}

fn round_to_step(value: f64, step: f64) -> f64 {
    let decimals = (-step.log10().floor()).max(0.0) as i32;
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub const fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub const fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub const fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, position: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return (d0 + d1) / 2.0;
        }
        d0 + (position - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Widens the domain by `fraction` of its span on both ends.
    #[must_use]
    pub fn padded(mut self, fraction: f64) -> Self {
        let (d0, d1) = self.domain;
        let span = d1 - d0;
        let pad = if span == 0.0 {
            (d0.abs() * fraction).max(fraction)
        } else {
            span * fraction
        };
        self.domain = (d0 - pad, d1 + pad);
        self
    }

    /// Extends the domain outward to round tick values.
    #[must_use]
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }
        let mut previous = 0.0;
        for _ in 0..10 {
            let step = tick_step(start, stop, count);
            if step == 0.0 || step == previous {
                break;
            }
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
            previous = step;
        }
        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
        let step = tick_step(lo, hi, count);
        if step == 0.0 {
            return if lo.is_finite() { vec![lo] } else { Vec::new() };
        }
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last)
            .map(|index| round_to_step(index as f64 * step, step))
            .collect()
    }
}

/// Square-root scale so that circle areas stay proportional to the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    inner: LinearScale,
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            inner: LinearScale::new((signed_sqrt(domain.0), signed_sqrt(domain.1)), range),
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        self.inner.map(signed_sqrt(value))
    }
}

fn signed_sqrt(value: f64) -> f64 {
    value.signum() * value.abs().sqrt()
}

/// Discrete domain split into evenly spaced bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale<T> {
    domain: Vec<T>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
}

impl<T: PartialEq> BandScale<T> {
    pub const fn new(domain: Vec<T>, range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
        }
    }

    #[must_use]
    pub fn padding(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self.padding_outer = padding.max(0.0);
        self
    }

    pub fn domain(&self) -> &[T] {
        &self.domain
    }

    pub fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        (r1 - r0) / (n - self.padding_inner + 2.0 * self.padding_outer).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding_inner)
    }

    fn start(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let used = self.step() * (n - self.padding_inner);
        r0 + (r1 - r0 - used) / 2.0
    }

    pub fn position_of_index(&self, index: usize) -> f64 {
        self.start() + self.step() * index as f64
    }

    pub fn map(&self, value: &T) -> Option<f64> {
        self.domain
            .iter()
            .position(|candidate| candidate == value)
            .map(|index| self.position_of_index(index))
    }

    /// Band under `position`; the padding after a band counts toward it.
    pub fn invert(&self, position: f64) -> Option<&T> {
        let step = self.step();
        if step <= 0.0 {
            return None;
        }
        let offset = (position - self.start()) / step;
        if offset < 0.0 {
            return None;
        }
        self.domain.get(offset.floor() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual}, diff {diff}");
    }

    #[test]
    fn extent_skips_non_finite_values() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 8.0]), Some((-1.0, 8.0)));
        assert_eq!(extent(std::iter::empty()), None);
    }

    #[test]
    fn linear_map_and_invert_round_trip() {
        let scale = LinearScale::new((2000.0, 2020.0), (0.0, 400.0));
        assert_close(scale.map(2010.0), 200.0);
        assert_close(scale.invert(300.0), 2015.0);
    }

    #[test]
    fn degenerate_domain_maps_to_range_midpoint() {
        let scale = LinearScale::new((5.0, 5.0), (0.0, 100.0));
        assert_close(scale.map(5.0), 50.0);
    }

    #[test]
    fn padding_widens_by_ten_percent() {
        let scale = LinearScale::new((10.0, 20.0), (0.0, 1.0)).padded(0.1);
        assert_eq!(scale.domain(), (9.0, 21.0));
    }

    #[test]
    fn nice_rounds_domain_outward() {
        let scale = LinearScale::new((0.213, 0.397), (0.0, 1.0)).nice(5);
        let (d0, d1) = scale.domain();
        assert_close(d0, 0.2);
        assert_close(d1, 0.4);
    }

    #[test]
    fn ticks_land_on_round_steps() {
        let scale = LinearScale::new((0.0, 1.0), (0.0, 1.0));
        assert_eq!(scale.ticks(5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        let seasons = LinearScale::new((2004.0, 2020.0), (0.0, 1.0));
        assert_eq!(seasons.ticks(4), vec![2005.0, 2010.0, 2015.0, 2020.0]);
    }

    #[test]
    fn bisect_center_picks_closest_and_is_stable_at_midpoint() {
        let xs = [0.0, 100.0, 200.0];
        assert_eq!(bisect_center(&xs, 30.0), Some(0));
        assert_eq!(bisect_center(&xs, 70.0), Some(1));
        assert_eq!(bisect_center(&xs, 50.0), Some(1));
        assert_eq!(bisect_center(&xs, 50.0), Some(1));
        assert_eq!(bisect_center(&xs, -40.0), Some(0));
        assert_eq!(bisect_center(&xs, 900.0), Some(2));
        assert_eq!(bisect_center(&[], 1.0), None);
    }

    #[test]
    fn sqrt_scale_keeps_area_proportional() {
        let scale = SqrtScale::new((0.0, 100.0), (0.0, 10.0));
        assert_close(scale.map(25.0), 5.0);
        assert_close(scale.map(100.0), 10.0);
    }

    #[test]
    fn band_scale_positions_and_inverts() {
        let scale = BandScale::new(vec!["a", "b", "c", "d"], (0.0, 400.0));
        assert_close(scale.step(), 100.0);
        assert_eq!(scale.map(&"c"), Some(200.0));
        assert_eq!(scale.invert(250.0), Some(&"c"));
        assert_eq!(scale.invert(-1.0), None);
        assert_eq!(scale.invert(401.0), None);
    }

    #[test]
    fn band_padding_shrinks_bandwidth() {
        let scale = BandScale::new(vec![1, 2], (0.0, 100.0)).padding(0.1);
        assert!(scale.bandwidth() < scale.step());
        assert!(scale.map(&1).unwrap_or_default() > 0.0);
    }
}
