use std::f64::consts::{FRAC_PI_2, TAU};

use crate::charts::{Chart, ChartControl, Size};
use crate::color::SequentialScale;
use crate::format;
use crate::model::MomentumPoint;
use crate::scale::{extent, LinearScale};
use crate::scene::{polyline_path, Layer, Node, Scene};
use crate::tooltip::{Callout, TooltipContent};

pub const HEIGHT: f64 = 440.0;
const MARGIN: f64 = 32.0;
const ANGLE_STEP: f64 = TAU / 12.0;
const INNER_RADIUS: f64 = 24.0;
/// Share of the available radius taken by the momentum value; the rest is
/// the per-season outward drift.
const MOMENTUM_SHARE: f64 = 0.55;
const DOT_RADIUS: f64 = 6.0;
const HIT_RADIUS: f64 = 18.0;

/// Seasons laid out on an outward spiral, one fixed angular step apart.
#[derive(Debug, Clone)]
pub struct MomentumSpiralChart {
    points: Vec<MomentumPoint>,
    size: Size,
    center: (f64, f64),
    radius: LinearScale,
    drift: f64,
    color: SequentialScale,
    focused: Option<usize>,
}

impl MomentumSpiralChart {
    pub fn new(mut points: Vec<MomentumPoint>, width: f64) -> Self {
        points.sort_by_key(|point| point.season);
        points.dedup_by_key(|point| point.season);

        let size = Size::new(width, HEIGHT);
        let max_radius = (width.min(HEIGHT) / 2.0 - MARGIN).max(INNER_RADIUS + 1.0);
        let span = max_radius - INNER_RADIUS;
        let momentum = extent(points.iter().map(|point| point.momentum)).unwrap_or((0.0, 1.0));
        let radius = LinearScale::new(
            momentum,
            (INNER_RADIUS, span.mul_add(MOMENTUM_SHARE, INNER_RADIUS)),
        );
        let drift = if points.len() > 1 {
            span * (1.0 - MOMENTUM_SHARE) / (points.len() - 1) as f64
        } else {
            0.0
        };
        let color = SequentialScale::new(
            extent(points.iter().map(|point| point.avg_three_pct)).unwrap_or((0.0, 1.0)),
        );

        Self {
            points,
            size,
            center: (width / 2.0, HEIGHT / 2.0),
            radius,
            drift,
            color,
            focused: None,
        }
    }

    pub fn points(&self) -> &[MomentumPoint] {
        &self.points
    }

    pub const fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Angle of the `index`th season, starting at twelve o'clock.
    pub fn angle_of(index: usize) -> f64 {
        (index as f64).mul_add(ANGLE_STEP, -FRAC_PI_2)
    }

    pub fn radius_of(&self, index: usize) -> f64 {
        self.points.get(index).map_or(0.0, |point| {
            (index as f64).mul_add(self.drift, self.radius.map(point.momentum))
        })
    }

    pub fn position_of(&self, index: usize) -> (f64, f64) {
        let angle = Self::angle_of(index);
        let radius = self.radius_of(index);
        (
            radius.mul_add(angle.cos(), self.center.0),
            radius.mul_add(angle.sin(), self.center.1),
        )
    }

    /// Ties go to the later season.
    fn nearest_index(&self, season: i32) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .min_by_key(|(_, point)| ((point.season - season).abs(), -point.season))
            .map(|(index, _)| index)
    }

    fn callout(&self, index: usize) -> Option<Callout> {
        let point = self.points.get(index)?;
        let (x, y) = self.position_of(index);
        Some(Callout {
            content: TooltipContent::new(point.season.to_string())
                .row("Momentum", format::number(point.momentum, 2))
                .row("3PA rate", format::percent(point.avg_three_rate, 1))
                .row("3P%", format::percent(point.avg_three_pct, 1)),
            x,
            y,
        })
    }
}

impl ChartControl for MomentumSpiralChart {
    fn focus_season(&mut self, season: i32) -> Option<Callout> {
        self.focused = self.nearest_index(season);
        self.focused.and_then(|index| self.callout(index))
    }
}

impl Chart for MomentumSpiralChart {
    fn scene(&self) -> Scene {
        let mut scene = Scene::new("spiral-chart", self.size.width, self.size.height);
        let positions: Vec<(f64, f64)> = (0..self.points.len())
            .map(|index| self.position_of(index))
            .collect();

        let mut guide = Layer::new("guide");
        guide.push(
            Node::new("circle")
                .class("spiral-origin")
                .num("cx", self.center.0)
                .num("cy", self.center.1)
                .num("r", 3.0),
        );
        if let Some(path) = polyline_path(&positions) {
            guide.push(
                Node::new("path")
                    .class("spiral-path")
                    .attr("d", path)
                    .attr("fill", "none"),
            );
        }
        scene.push(guide);

        let mut dots = Layer::keyed("dots");
        for (index, (point, (x, y))) in self.points.iter().zip(&positions).enumerate() {
            let focused = self.focused == Some(index);
            dots.push(
                Node::new("circle")
                    .key(point.season.to_string())
                    .class(if focused { "spiral-dot is-focused" } else { "spiral-dot" })
                    .num("cx", *x)
                    .num("cy", *y)
                    .num("r", if focused { DOT_RADIUS * 1.6 } else { DOT_RADIUS })
                    .attr("fill", self.color.map(point.avg_three_pct).css())
                    .on_enter("r", "0"),
            );
        }
        scene.push(dots);

        let mut labels = Layer::new("labels");
        let mut ends = vec![0, self.points.len().saturating_sub(1)];
        ends.dedup();
        for index in ends.into_iter().filter(|i| *i < self.points.len()) {
            let (x, y) = positions[index];
            labels.push(
                Node::new("text")
                    .class("spiral-label")
                    .num("x", x + DOT_RADIUS + 4.0)
                    .num("y", y + 4.0)
                    .text(self.points[index].season.to_string()),
            );
        }
        scene.push(labels);
        scene
    }

    fn hover(&self, x: f64, y: f64) -> Option<Callout> {
        (0..self.points.len())
            .map(|index| {
                let (px, py) = self.position_of(index);
                (index, (px - x).hypot(py - y))
            })
            .filter(|(_, distance)| *distance <= HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(index, _)| self.callout(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(season: i32, momentum: f64) -> MomentumPoint {
        MomentumPoint {
            season,
            momentum,
            avg_three_rate: 0.3,
            avg_three_pct: 0.35,
        }
    }

    fn chart(momentum: f64) -> MomentumSpiralChart {
        MomentumSpiralChart::new(
            (0..6).rev().map(|i| point(2015 + i, momentum)).collect(),
            600.0,
        )
    }

    #[test]
    fn flat_momentum_still_spirals_outward() {
        let chart = chart(1.0);
        let radii: Vec<f64> = (0..chart.points().len()).map(|i| chart.radius_of(i)).collect();
        assert!(radii.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn seasons_are_a_fixed_angle_apart() {
        let step = MomentumSpiralChart::angle_of(3) - MomentumSpiralChart::angle_of(2);
        assert!((step - ANGLE_STEP).abs() < 1e-12);
        assert!((MomentumSpiralChart::angle_of(0) + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn points_stay_inside_the_surface() {
        let chart = MomentumSpiralChart::new(
            vec![point(2015, -2.0), point(2016, 0.5), point(2017, 3.0)],
            600.0,
        );
        for index in 0..3 {
            let (x, y) = chart.position_of(index);
            assert!((0.0..=600.0).contains(&x));
            assert!((0.0..=HEIGHT).contains(&y));
        }
    }

    #[test]
    fn focus_season_snaps_and_enlarges_dot() {
        let mut chart = chart(0.0);
        let callout = chart.focus_season(2030).unwrap();
        assert_eq!(callout.content.title, "2020");

        let scene = chart.scene();
        let dots = scene.layer("dots").unwrap();
        assert!(dots.find("2020").is_some_and(|node| node.has_class("is-focused")));
        assert_eq!(dots.nodes.len(), 6);
    }

    #[test]
    fn focus_between_seasons_prefers_the_later_one() {
        let mut chart = MomentumSpiralChart::new(vec![point(2016, 0.5), point(2018, 0.7)], 600.0);
        let callout = chart.focus_season(2017).unwrap();
        assert_eq!(callout.content.title, "2018");
    }

    #[test]
    fn hover_picks_nearest_dot() {
        let chart = chart(1.0);
        let (x, y) = chart.position_of(2);
        let callout = chart.hover(x + 2.0, y - 1.0).unwrap();
        assert_eq!(callout.content.title, "2017");
        assert_eq!(callout.content.value_of("3P%"), Some("35.0%"));
        assert!(chart.hover(-100.0, -100.0).is_none());
    }
}
