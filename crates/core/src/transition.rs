use crate::color::Rgb;
use crate::scene::{num, Attr, Node};

pub const DEFAULT_DURATION_MS: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Running,
    Finished,
}

/// Elapsed-time bookkeeping for one time-boxed transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    elapsed: f64,
    last_tick: Option<f64>,
    duration: f64,
}

impl Transition {
    pub const fn new(duration_ms: f64) -> Self {
        Self {
            elapsed: 0.0,
            last_tick: None,
            duration: duration_ms,
        }
    }

    /// Advances to `now_ms` and returns the eased progress in `0..=1`.
    pub fn advance(&mut self, now_ms: f64) -> f64 {
        let (elapsed, last_tick) = advance_elapsed(self.elapsed, self.last_tick, now_ms);
        self.elapsed = elapsed;
        self.last_tick = last_tick;
        ease_cubic_in_out(self.linear_progress())
    }

    pub fn linear_progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn state(&self) -> TransitionState {
        if self.linear_progress() >= 1.0 {
            TransitionState::Finished
        } else {
            TransitionState::Running
        }
    }
}

/// Wall-clock time, so slow frames skip ahead instead of stretching the
/// transition. Time running backwards counts as no time.
fn advance_elapsed(elapsed: f64, last_tick: Option<f64>, now_ms: f64) -> (f64, Option<f64>) {
    let delta = last_tick.map(|last| (now_ms - last).max(0.0)).unwrap_or(0.0);
    (elapsed + delta, Some(now_ms))
}

pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        t.mul_add(t * t, 2.0) / 2.0
    }
}

fn parse_hex(value: &str) -> Option<Rgb> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(Rgb::from_hex)
}

/// Value of one attribute at progress `t` between `from` and `to`.
///
/// Numbers and `#rrggbb` colors interpolate; anything else snaps to `to`.
pub fn tween_value(from: &str, to: &str, t: f64) -> String {
    if let (Ok(a), Ok(b)) = (from.parse::<f64>(), to.parse::<f64>()) {
        return num((b - a).mul_add(t, a));
    }
    if let (Some(a), Some(b)) = (parse_hex(from), parse_hex(to)) {
        return a.lerp(b, t).css();
    }
    to.to_string()
}

/// Attributes of `to` at progress `t`, starting from `from` where it has them.
pub fn tween_attrs(from: &[Attr], to: &Node, t: f64) -> Vec<Attr> {
    to.attrs
        .iter()
        .map(|(name, target)| {
            let start = from
                .iter()
                .find(|(candidate, _)| candidate == name)
                .map_or(target.as_str(), |(_, value)| value.as_str());
            (*name, tween_value(start, target, t))
        })
        .collect()
}
