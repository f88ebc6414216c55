use crate::charts::{
    axis_bottom, axis_left, season_label, season_ticks, Chart, ChartControl, Margins, Size,
};
use crate::color::share_color;
use crate::format;
use crate::model::{MixShare, ScoringMixRecord};
use crate::scale::{bisect_center, extent, LinearScale};
use crate::scene::{area_path, Layer, Node, Scene};
use crate::tooltip::{Callout, TooltipContent};

pub const HEIGHT: f64 = 320.0;

/// Stacked share of points from twos, threes and free throws per season.
#[derive(Debug, Clone)]
pub struct ScoringMixChart {
    records: Vec<ScoringMixRecord>,
    size: Size,
    margins: Margins,
    x: LinearScale,
    y: LinearScale,
    xs: Vec<f64>,
    emphasis: Option<MixShare>,
    focused: Option<usize>,
}

impl ScoringMixChart {
    pub fn new(mut records: Vec<ScoringMixRecord>, width: f64) -> Self {
        records.sort_by_key(|record| record.season);
        records.dedup_by_key(|record| record.season);

        let size = Size::new(width, HEIGHT);
        let margins = Margins::STANDARD;
        let seasons = extent(records.iter().map(|r| f64::from(r.season))).unwrap_or((0.0, 1.0));
        let x = LinearScale::new(seasons, margins.x_range(size));
        let y = LinearScale::new((0.0, 1.0), margins.y_range(size));
        let xs = records.iter().map(|r| x.map(f64::from(r.season))).collect();

        Self {
            records,
            size,
            margins,
            x,
            y,
            xs,
            emphasis: None,
            focused: None,
        }
    }

    pub const fn emphasis(&self) -> Option<MixShare> {
        self.emphasis
    }

    /// Lower and upper cumulative share of `share` in one record.
    fn band(record: &ScoringMixRecord, share: MixShare) -> (f64, f64) {
        let mut lower = 0.0;
        for candidate in MixShare::ALL {
            let upper = lower + record.share(candidate);
            if candidate == share {
                return (lower, upper);
            }
            lower = upper;
        }
        (lower, lower)
    }

    fn callout(&self, index: usize) -> Option<Callout> {
        let record = self.records.get(index)?;
        let content = MixShare::ALL.into_iter().rev().fold(
            TooltipContent::new(record.season.to_string()),
            |content, share| content.row(share.label(), format::percent(record.share(share), 1)),
        );
        let anchor = self.emphasis.unwrap_or(MixShare::Three);
        let (lower, upper) = Self::band(record, anchor);
        Some(Callout {
            content,
            x: self.xs[index],
            y: self.y.map((lower + upper) / 2.0),
        })
    }
}

impl ChartControl for ScoringMixChart {
    fn set_metric(&mut self, key: &str) -> Option<Callout> {
        self.emphasis = MixShare::parse(key);
        self.focused.and_then(|index| self.callout(index))
    }

    fn focus_season(&mut self, season: i32) -> Option<Callout> {
        let seasons: Vec<f64> = self.records.iter().map(|r| f64::from(r.season)).collect();
        self.focused = bisect_center(&seasons, f64::from(season));
        self.focused.and_then(|index| self.callout(index))
    }
}

impl Chart for ScoringMixChart {
    fn scene(&self) -> Scene {
        let mut scene = Scene::new("mix-chart", self.size.width, self.size.height);
        let inner = self.margins.inner(self.size);
        let baseline = self.margins.top + inner.height;

        let mut axes = Layer::new("axes");
        axes.nodes.extend(axis_bottom(
            &self.x,
            &season_ticks(&self.x, 8),
            baseline,
            season_label,
        ));
        axes.nodes.extend(axis_left(
            &self.y,
            &self.y.ticks(4),
            self.margins.left,
            inner.width,
            |tick| format::percent(tick, 0),
        ));
        scene.push(axes);

        let mut areas = Layer::keyed("areas");
        for share in MixShare::ALL {
            let (upper, lower): (Vec<_>, Vec<_>) = self
                .records
                .iter()
                .zip(&self.xs)
                .map(|(record, x)| {
                    let (low, high) = Self::band(record, share);
                    ((*x, self.y.map(high)), (*x, self.y.map(low)))
                })
                .unzip();
            let Some(path) = area_path(&upper, &lower) else {
                continue;
            };
            let opacity = match self.emphasis {
                Some(emphasis) if emphasis != share => 0.25,
                _ => 0.85,
            };
            areas.push(
                Node::new("path")
                    .key(share.key())
                    .class("mix-area")
                    .attr("d", path)
                    .attr("fill", share_color(share))
                    .num("opacity", opacity),
            );
        }
        scene.push(areas);

        let mut focus = Layer::new("focus");
        if let Some(x) = self.focused.and_then(|index| self.xs.get(index)) {
            focus.push(
                Node::new("line")
                    .class("focus-rule")
                    .num("x1", *x)
                    .num("x2", *x)
                    .num("y1", self.margins.top)
                    .num("y2", baseline),
            );
        }
        scene.push(focus);
        scene
    }

    fn hover(&self, x: f64, _y: f64) -> Option<Callout> {
        bisect_center(&self.xs, x).and_then(|index| self.callout(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(season: i32, two: f64, three: f64, ft: f64) -> ScoringMixRecord {
        ScoringMixRecord {
            season,
            two_pct: two,
            three_pct: three,
            ft_pct: ft,
        }
    }

    fn chart() -> ScoringMixChart {
        ScoringMixChart::new(
            vec![record(2010, 0.6, 0.22, 0.18), record(2020, 0.5, 0.33, 0.17)],
            500.0,
        )
    }

    #[test]
    fn bands_stack_in_order() {
        let (lower, upper) = ScoringMixChart::band(&record(2010, 0.6, 0.22, 0.18), MixShare::Three);
        assert!((lower - 0.6).abs() < 1e-9);
        assert!((upper - 0.82).abs() < 1e-9);
    }

    #[test]
    fn hover_lists_all_three_shares() {
        let chart = chart();
        let callout = chart.hover(chart.xs[1] - 5.0, 0.0).unwrap();
        assert_eq!(callout.content.title, "2020");
        assert_eq!(callout.content.rows.len(), 3);
        assert_eq!(callout.content.value_of("Three-pointers"), Some("33.0%"));
    }

    #[test]
    fn set_metric_emphasises_one_band() {
        let mut chart = chart();
        chart.set_metric("ftPct");
        assert_eq!(chart.emphasis(), Some(MixShare::FreeThrow));

        let scene = chart.scene();
        let areas = scene.layer("areas").unwrap();
        assert_eq!(areas.find("ftPct").and_then(|n| n.get("opacity")), Some("0.85"));
        assert_eq!(areas.find("twoPct").and_then(|n| n.get("opacity")), Some("0.25"));
    }

    #[test]
    fn focus_season_adds_rule() {
        let mut chart = chart();
        assert!(chart.focus_season(2010).is_some());
        assert_eq!(chart.scene().layer("focus").map(|l| l.nodes.len()), Some(1));
    }
}
