//! The six dashboard charts and the control surface they share.
//!
//! Every chart is plain state built from one dataset and a measured width.
//! It renders into a [`Scene`] and answers pointer queries with an optional
//! [`Callout`]; nothing here touches the DOM.

pub mod heatmap;
pub mod map;
pub mod mix;
pub mod scatter;
pub mod spiral;
pub mod trend;

pub use heatmap::HeatmapChart;
pub use map::TeamMapChart;
pub use mix::ScoringMixChart;
pub use scatter::TeamScatterChart;
pub use spiral::MomentumSpiralChart;
pub use trend::TrendChart;

use crate::scale::LinearScale;
use crate::scene::Node;
use crate::tooltip::Callout;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const STANDARD: Self = Self {
        top: 24.0,
        right: 24.0,
        bottom: 40.0,
        left: 56.0,
    };

    pub fn inner(&self, size: Size) -> Size {
        Size::new(
            (size.width - self.left - self.right).max(1.0),
            (size.height - self.top - self.bottom).max(1.0),
        )
    }

    pub fn x_range(&self, size: Size) -> (f64, f64) {
        (self.left, self.left + self.inner(size).width)
    }

    /// Bottom to top, so larger values sit higher.
    pub fn y_range(&self, size: Size) -> (f64, f64) {
        (self.top + self.inner(size).height, self.top)
    }
}

/// Team and/or season to bring forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightRequest {
    pub team: Option<String>,
    pub season: Option<i32>,
}

/// Operations a chart may expose to the story controller.
///
/// Each method is optional; charts only override what they support and the
/// rest are no-ops. A returned [`Callout`] is shown in the shared tooltip.
pub trait ChartControl {
    fn set_metric(&mut self, _key: &str) -> Option<Callout> {
        None
    }

    fn focus_season(&mut self, _season: i32) -> Option<Callout> {
        None
    }

    fn set_season(&mut self, _season: i32) -> Option<Callout> {
        None
    }

    fn highlight(&mut self, _request: &HighlightRequest) -> Option<Callout> {
        None
    }

    fn focus_conference(&mut self, _conference: &str) -> Option<Callout> {
        None
    }
}

/// A renderable chart.
pub trait Chart: ChartControl {
    fn scene(&self) -> crate::scene::Scene;

    /// Tooltip for the pointer at chart coordinates `(x, y)`.
    fn hover(&self, x: f64, y: f64) -> Option<Callout>;

    /// Text for DOM anchors outside the drawing, as `(element id, text)`.
    fn annotations(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

pub(crate) fn axis_bottom(
    scale: &LinearScale,
    ticks: &[f64],
    y: f64,
    label: impl Fn(f64) -> String,
) -> Vec<Node> {
    let (x0, x1) = scale.range();
    let mut nodes = vec![Node::new("line")
        .class("axis-domain")
        .num("x1", x0)
        .num("x2", x1)
        .num("y1", y)
        .num("y2", y)];
    nodes.extend(ticks.iter().map(|tick| {
        let x = scale.map(*tick);
        Node::new("text")
            .class("axis-tick")
            .num("x", x)
            .num("y", y + 18.0)
            .attr("text-anchor", "middle")
            .text(label(*tick))
    }));
    nodes
}

pub(crate) fn axis_left(
    scale: &LinearScale,
    ticks: &[f64],
    x: f64,
    width: f64,
    label: impl Fn(f64) -> String,
) -> Vec<Node> {
    ticks
        .iter()
        .flat_map(|tick| {
            let y = scale.map(*tick);
            [
                Node::new("line")
                    .class("grid-line")
                    .num("x1", x)
                    .num("x2", x + width)
                    .num("y1", y)
                    .num("y2", y),
                Node::new("text")
                    .class("axis-tick")
                    .num("x", x - 8.0)
                    .num("y", y + 4.0)
                    .attr("text-anchor", "end")
                    .text(label(*tick)),
            ]
        })
        .collect()
}

/// Integer season ticks, at most `count` of them.
pub(crate) fn season_ticks(scale: &LinearScale, count: usize) -> Vec<f64> {
    scale
        .ticks(count)
        .into_iter()
        .filter(|tick| tick.fract() == 0.0)
        .collect()
}

pub(crate) fn season_label(season: f64) -> String {
    format!("{season:.0}")
}
