use crate::charts::{
    axis_bottom, axis_left, season_label, season_ticks, Chart, ChartControl, Margins, Size,
};
use crate::color::metric_color;
use crate::format;
use crate::model::{Metric, SeasonMetric};
use crate::scale::{bisect_center, extent, LinearScale};
use crate::scene::{polyline_path, Layer, Node, Scene};
use crate::tooltip::{Callout, TooltipContent};

pub const HEIGHT: f64 = 360.0;
const INDEX_AXIS_TITLE: &str = "Index (first season = 100)";

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub metric: Metric,
    pub label: &'static str,
    pub color: &'static str,
    pub active: bool,
}

/// League-wide season trends, one line per metric.
///
/// Without a metric filter every line is indexed to its first season (= 100)
/// so different units share one axis. With a filter only that metric is drawn,
/// on its own axis, and tooltips list only that metric.
#[derive(Debug, Clone)]
pub struct TrendChart {
    records: Vec<SeasonMetric>,
    size: Size,
    margins: Margins,
    x: LinearScale,
    xs: Vec<f64>,
    active: Option<Metric>,
    focused: Option<usize>,
}

pub fn format_metric(metric: Metric, value: f64) -> String {
    if metric.is_share() {
        format::percent(value, 1)
    } else {
        format::number(value, 1)
    }
}

impl TrendChart {
    pub fn new(mut records: Vec<SeasonMetric>, width: f64) -> Self {
        records.sort_by_key(|record| record.season);
        records.dedup_by_key(|record| record.season);

        let size = Size::new(width, HEIGHT);
        let margins = Margins::STANDARD;
        let seasons = extent(records.iter().map(|r| f64::from(r.season))).unwrap_or((0.0, 1.0));
        let x = LinearScale::new(seasons, margins.x_range(size));
        let xs = records.iter().map(|r| x.map(f64::from(r.season))).collect();

        Self {
            records,
            size,
            margins,
            x,
            xs,
            active: None,
            focused: None,
        }
    }

    pub const fn active_metric(&self) -> Option<Metric> {
        self.active
    }

    pub fn records(&self) -> &[SeasonMetric] {
        &self.records
    }

    pub fn visible_metrics(&self) -> Vec<Metric> {
        self.active.map_or_else(|| Metric::ALL.to_vec(), |metric| vec![metric])
    }

    pub fn legend_items(&self) -> Vec<LegendItem> {
        Metric::ALL
            .into_iter()
            .map(|metric| LegendItem {
                metric,
                label: metric.label(),
                color: metric_color(metric),
                active: self.active.map_or(true, |active| active == metric),
            })
            .collect()
    }

    /// Legend clicks: selecting the active metric again clears the filter.
    pub fn toggle_metric(&mut self, metric: Metric) -> Option<Callout> {
        self.active = if self.active == Some(metric) {
            None
        } else {
            Some(metric)
        };
        self.focused.and_then(|index| self.callout(index))
    }

    fn plot_value(&self, metric: Metric, record: &SeasonMetric) -> f64 {
        let value = metric.value(record);
        if self.active.is_some() {
            return value;
        }
        let base = self
            .records
            .first()
            .map(|first| metric.value(first))
            .unwrap_or_default();
        if base == 0.0 {
            100.0
        } else {
            value / base * 100.0
        }
    }

    pub fn y_scale(&self) -> LinearScale {
        let values = self.visible_metrics().into_iter().flat_map(|metric| {
            self.records
                .iter()
                .map(move |record| self.plot_value(metric, record))
        });
        let domain = extent(values).unwrap_or((0.0, 1.0));
        LinearScale::new(domain, self.margins.y_range(self.size))
            .padded(0.1)
            .nice(5)
    }

    fn index_of_season(&self, season: i32) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.season == season)
            .or_else(|| {
                let seasons: Vec<f64> = self.records.iter().map(|r| f64::from(r.season)).collect();
                bisect_center(&seasons, f64::from(season))
            })
    }

    fn callout(&self, index: usize) -> Option<Callout> {
        let record = self.records.get(index)?;
        let mut content = TooltipContent::new(record.season.to_string());
        for metric in self.visible_metrics() {
            content = content.row(metric.label(), format_metric(metric, metric.value(record)));
        }
        let y_scale = self.y_scale();
        let anchor_metric = self.visible_metrics()[0];
        Some(Callout {
            content,
            x: self.xs[index],
            y: y_scale.map(self.plot_value(anchor_metric, record)),
        })
    }

    fn line_points(&self, metric: Metric, y: &LinearScale) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .zip(&self.xs)
            .map(|(record, x)| (*x, y.map(self.plot_value(metric, record))))
            .collect()
    }
}

impl ChartControl for TrendChart {
    fn set_metric(&mut self, key: &str) -> Option<Callout> {
        self.active = Metric::parse(key);
        if self.active.is_none() && !key.trim().is_empty() && !key.eq_ignore_ascii_case("all") {
            log::warn!("unknown trend metric {key:?}; showing all metrics");
        }
        self.focused.and_then(|index| self.callout(index))
    }

    fn focus_season(&mut self, season: i32) -> Option<Callout> {
        self.focused = self.index_of_season(season);
        self.focused.and_then(|index| self.callout(index))
    }
}

impl Chart for TrendChart {
    fn scene(&self) -> Scene {
        let mut scene = Scene::new("trend-chart", self.size.width, self.size.height);
        let y = self.y_scale();
        let inner = self.margins.inner(self.size);
        let baseline = self.margins.top + inner.height;

        let y_label = self
            .active
            .map_or(INDEX_AXIS_TITLE, |metric| metric.label());
        let active = self.active;
        let mut axes = Layer::new("axes");
        axes.nodes.extend(axis_bottom(
            &self.x,
            &season_ticks(&self.x, 8),
            baseline,
            season_label,
        ));
        axes.nodes.extend(axis_left(
            &y,
            &y.ticks(5),
            self.margins.left,
            inner.width,
            |tick| match active {
                Some(metric) => format_metric(metric, tick),
                None => format::number(tick, 0),
            },
        ));
        axes.push(
            Node::new("text")
                .class("axis-title")
                .num("x", self.margins.left)
                .num("y", self.margins.top - 8.0)
                .text(y_label),
        );
        scene.push(axes);

        let mut lines = Layer::keyed("lines");
        for metric in self.visible_metrics() {
            let Some(path) = polyline_path(&self.line_points(metric, &y)) else {
                continue;
            };
            lines.push(
                Node::new("path")
                    .key(metric.key())
                    .class("trend-line")
                    .attr("d", path)
                    .attr("fill", "none")
                    .attr("stroke", metric_color(metric))
                    .num("stroke-width", 2.5)
                    .num("opacity", 1.0)
                    .on_enter("opacity", "0")
                    .on_exit("opacity", "0"),
            );
        }
        scene.push(lines);

        let mut focus = Layer::new("focus");
        if let Some(index) = self.focused {
            let x = self.xs[index];
            focus.push(
                Node::new("line")
                    .class("focus-rule")
                    .num("x1", x)
                    .num("x2", x)
                    .num("y1", self.margins.top)
                    .num("y2", baseline),
            );
            for metric in self.visible_metrics() {
                let record = &self.records[index];
                focus.push(
                    Node::new("circle")
                        .class("focus-dot")
                        .num("cx", x)
                        .num("cy", y.map(self.plot_value(metric, record)))
                        .num("r", 5.0)
                        .attr("fill", metric_color(metric)),
                );
            }
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

    fn season(season: i32, attempts: f64, points: f64, rate: f64) -> SeasonMetric {
        SeasonMetric {
            season,
            avg_three_attempts: attempts,
            avg_points: points,
            avg_three_rate: rate,
            avg_three_pct: None,
            team_games: None,
        }
    }

    fn chart() -> TrendChart {
        TrendChart::new(
            vec![
                season(2020, 34.6, 111.8, 0.384),
                season(2018, 29.0, 106.3, 0.337),
                season(2019, 32.0, 111.2, 0.357),
            ],
            640.0,
        )
    }

    #[test]
    fn records_are_sorted_by_season() {
        let seasons: Vec<i32> = chart().records().iter().map(|r| r.season).collect();
        assert_eq!(seasons, vec![2018, 2019, 2020]);
    }

    #[test]
    fn hover_between_seasons_is_deterministic() {
        let chart = chart();
        let midpoint = (chart.xs[0] + chart.xs[1]) / 2.0;
        let first = chart.hover(midpoint, 0.0).map(|c| c.content.title);
        let second = chart.hover(midpoint, 0.0).map(|c| c.content.title);
        assert_eq!(first.as_deref(), Some("2019"));
        assert_eq!(first, second);
        assert_eq!(
            chart.hover(chart.xs[0] + 1.0, 0.0).map(|c| c.content.title).as_deref(),
            Some("2018")
        );
    }

    #[test]
    fn metric_filter_limits_tooltip_rows() {
        let mut chart = chart();
        chart.set_metric("avgPoints");
        let callout = chart.focus_season(2019).unwrap();

        assert_eq!(callout.content.rows.len(), 1);
        assert_eq!(callout.content.value_of("Points per game"), Some("111.2"));
    }

    #[test]
    fn unfiltered_tooltip_lists_every_metric() {
        let mut chart = chart();
        let callout = chart.focus_season(2020).unwrap();
        assert_eq!(callout.content.rows.len(), 3);
        assert_eq!(callout.content.value_of("3PA rate"), Some("38.4%"));
    }

    #[test]
    fn unknown_metric_clears_filter() {
        let mut chart = chart();
        chart.set_metric("avgPoints");
        chart.set_metric("rebounds");
        assert_eq!(chart.active_metric(), None);
    }

    #[test]
    fn focusing_missing_season_snaps_to_nearest() {
        let mut chart = chart();
        let callout = chart.focus_season(2031).unwrap();
        assert_eq!(callout.content.title, "2020");
    }

    #[test]
    fn legend_toggle_round_trips() {
        let mut chart = chart();
        chart.toggle_metric(Metric::AvgThreeRate);
        assert_eq!(chart.active_metric(), Some(Metric::AvgThreeRate));
        assert!(!chart.legend_items()[0].active);
        chart.toggle_metric(Metric::AvgThreeRate);
        assert_eq!(chart.active_metric(), None);
        assert!(chart.legend_items().iter().all(|item| item.active));
    }

    #[test]
    fn scene_draws_only_the_active_line() {
        let mut chart = chart();
        assert_eq!(chart.scene().layer("lines").map(|l| l.nodes.len()), Some(3));
        chart.set_metric("avgThreeAttempts");
        let scene = chart.scene();
        let lines = scene.layer("lines").unwrap();
        assert_eq!(lines.nodes.len(), 1);
        assert!(lines.find("avgThreeAttempts").is_some());
    }

    #[test]
    fn indexed_lines_start_at_one_hundred() {
        let chart = chart();
        let first = &chart.records()[0];
        for metric in Metric::ALL {
            assert!((chart.plot_value(metric, first) - 100.0).abs() < 1e-9);
        }
    }
}
