use std::collections::HashMap;

use crate::charts::{Chart, ChartControl, HighlightRequest, Margins, Size};
use crate::color::SequentialScale;
use crate::format;
use crate::model::HeatmapCell;
use crate::scale::{bisect_center, extent, BandScale};
use crate::scene::{Layer, Node, Scene};
use crate::tooltip::{Callout, TooltipContent};

pub const ROW_HEIGHT: f64 = 18.0;
const MARGINS: Margins = Margins {
    top: 36.0,
    right: 16.0,
    bottom: 36.0,
    left: 56.0,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct TeamRow {
    abbr: String,
    name: String,
}

/// Team × season grid of three-point attempt rate.
///
/// Rows are ranked by the most recent season's rate; the colour scale spans
/// every observed rate so seasons compare directly.
#[derive(Debug, Clone)]
pub struct HeatmapChart {
    cells: HashMap<(i32, String), HeatmapCell>,
    teams: Vec<TeamRow>,
    x: BandScale<i32>,
    y: BandScale<String>,
    color: SequentialScale,
    size: Size,
    focused_season: Option<i32>,
    highlighted: Option<String>,
}

/// Team codes by descending rate in the latest season.
///
/// The sort is stable, so ties keep the order teams first appear in `cells`;
/// teams missing from the latest season rank last.
pub fn team_order(cells: &[HeatmapCell]) -> Vec<String> {
    let latest = cells.iter().map(|cell| cell.season).max();
    let mut order: Vec<(String, f64)> = Vec::new();
    for cell in cells {
        if !order.iter().any(|(abbr, _)| *abbr == cell.abbr) {
            order.push((cell.abbr.clone(), f64::NEG_INFINITY));
        }
        if Some(cell.season) == latest {
            if let Some(slot) = order.iter_mut().find(|(abbr, _)| *abbr == cell.abbr) {
                slot.1 = cell.three_rate;
            }
        }
    }
    order.sort_by(|a, b| b.1.total_cmp(&a.1));
    order.into_iter().map(|(abbr, _)| abbr).collect()
}

impl HeatmapChart {
    pub fn new(records: Vec<HeatmapCell>, width: f64) -> Self {
        let order = team_order(&records);
        let mut seasons: Vec<i32> = records.iter().map(|cell| cell.season).collect();
        seasons.sort_unstable();
        seasons.dedup();

        let teams: Vec<TeamRow> = order
            .iter()
            .map(|abbr| TeamRow {
                abbr: abbr.clone(),
                name: records
                    .iter()
                    .rev()
                    .find(|cell| cell.abbr == *abbr)
                    .map(HeatmapCell::display_name)
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| abbr.clone()),
            })
            .collect();

        let size = Size::new(
            width,
            (teams.len() as f64).mul_add(ROW_HEIGHT, MARGINS.top + MARGINS.bottom),
        );
        let color = SequentialScale::new(
            extent(records.iter().map(|cell| cell.three_rate)).unwrap_or((0.0, 1.0)),
        );
        let cells = records
            .into_iter()
            .map(|cell| ((cell.season, cell.abbr.clone()), cell))
            .collect();

        Self {
            cells,
            x: BandScale::new(seasons, MARGINS.x_range(size)).padding(0.05),
            y: BandScale::new(order, (MARGINS.top, size.height - MARGINS.bottom)).padding(0.05),
            teams,
            color,
            size,
            focused_season: None,
            highlighted: None,
        }
    }

    pub fn team_order(&self) -> Vec<&str> {
        self.teams.iter().map(|row| row.abbr.as_str()).collect()
    }

    pub const fn height(&self) -> f64 {
        self.size.height
    }

    fn callout_for(&self, cell: &HeatmapCell) -> Option<Callout> {
        let x = self.x.map(&cell.season)? + self.x.bandwidth() / 2.0;
        let y = self.y.map(&cell.abbr)? + self.y.bandwidth() / 2.0;
        let name = cell.display_name();
        let title = if name.is_empty() { cell.abbr.clone() } else { name };
        Some(Callout {
            content: TooltipContent::new(format!("{title} · {}", cell.season))
                .row("3PA rate", format::percent(cell.three_rate, 1))
                .row("3P%", format::percent(cell.three_pct, 1)),
            x,
            y,
        })
    }

    fn nearest_season(&self, season: i32) -> Option<i32> {
        let seasons: Vec<f64> = self.x.domain().iter().map(|s| f64::from(*s)).collect();
        bisect_center(&seasons, f64::from(season)).map(|index| self.x.domain()[index])
    }

    fn resolve_team(&self, query: &str) -> Option<String> {
        let query = query.trim();
        self.teams
            .iter()
            .find(|row| {
                row.abbr.eq_ignore_ascii_case(query)
                    || row.name.eq_ignore_ascii_case(query)
                    || row
                        .name
                        .rsplit(' ')
                        .next()
                        .is_some_and(|nickname| nickname.eq_ignore_ascii_case(query))
            })
            .map(|row| row.abbr.clone())
    }

    fn focused_callout(&self) -> Option<Callout> {
        let abbr = self.highlighted.clone()?;
        let season = self
            .focused_season
            .or_else(|| self.x.domain().last().copied())?;
        self.cells
            .get(&(season, abbr))
            .and_then(|cell| self.callout_for(cell))
    }
}

impl ChartControl for HeatmapChart {
    fn focus_season(&mut self, season: i32) -> Option<Callout> {
        self.focused_season = self.nearest_season(season);
        self.focused_callout()
    }

    fn highlight(&mut self, request: &HighlightRequest) -> Option<Callout> {
        if let Some(season) = request.season {
            self.focused_season = self.nearest_season(season);
        }
        if let Some(team) = request.team.as_deref() {
            self.highlighted = self.resolve_team(team);
            if self.highlighted.is_none() {
                log::warn!("heatmap has no team matching {team:?}");
            }
        }
        self.focused_callout()
    }
}

impl Chart for HeatmapChart {
    fn scene(&self) -> Scene {
        let mut scene = Scene::new("heatmap-chart", self.size.width, self.size.height);
        let seasons = self.x.domain();
        let label_every = (seasons.len() / 12).max(1);

        let mut axes = Layer::new("axes");
        for (index, season) in seasons.iter().enumerate() {
            if index % label_every != 0 {
                continue;
            }
            let x = self.x.position_of_index(index) + self.x.bandwidth() / 2.0;
            axes.push(
                Node::new("text")
                    .class("axis-tick")
                    .num("x", x)
                    .num("y", MARGINS.top - 10.0)
                    .attr("text-anchor", "middle")
                    .text(season.to_string()),
            );
        }
        for (index, row) in self.teams.iter().enumerate() {
            let y = self.y.position_of_index(index) + self.y.bandwidth() / 2.0;
            let class = if self.highlighted.as_deref() == Some(row.abbr.as_str()) {
                "axis-tick is-highlighted"
            } else {
                "axis-tick"
            };
            axes.push(
                Node::new("text")
                    .class(class)
                    .num("x", MARGINS.left - 8.0)
                    .num("y", y + 4.0)
                    .attr("text-anchor", "end")
                    .text(row.abbr.clone()),
            );
        }
        scene.push(axes);

        let mut cells = Layer::keyed("cells");
        for (row_index, row) in self.teams.iter().enumerate() {
            for (column, season) in seasons.iter().enumerate() {
                let Some(cell) = self.cells.get(&(*season, row.abbr.clone())) else {
                    continue;
                };
                let dimmed = self.focused_season.is_some_and(|focus| focus != *season)
                    || self
                        .highlighted
                        .as_deref()
                        .is_some_and(|team| team != row.abbr);
                cells.push(
                    Node::new("rect")
                        .key(format!("{season}-{}", row.abbr))
                        .class("heat-cell")
                        .num("x", self.x.position_of_index(column))
                        .num("y", self.y.position_of_index(row_index))
                        .num("width", self.x.bandwidth())
                        .num("height", self.y.bandwidth())
                        .attr("fill", self.color.map(cell.three_rate).css())
                        .num("opacity", if dimmed { 0.45 } else { 1.0 }),
                );
            }
        }
        scene.push(cells);

        let mut legend = Layer::new("legend");
        let legend_y = self.size.height - MARGINS.bottom + 12.0;
        let swatch = 24.0;
        let (low, high) =
            extent(self.cells.values().map(|cell| cell.three_rate)).unwrap_or((0.0, 1.0));
        for step in 0..=4 {
            let t = f64::from(step) / 4.0;
            legend.push(
                Node::new("rect")
                    .class("legend-swatch")
                    .num("x", f64::from(step).mul_add(swatch, MARGINS.left))
                    .num("y", legend_y)
                    .num("width", swatch)
                    .num("height", 10.0)
                    .attr("fill", self.color.map((high - low).mul_add(t, low)).css()),
            );
        }
        scene.push(legend);
        scene
    }

    fn hover(&self, x: f64, y: f64) -> Option<Callout> {
        let season = self.x.invert(x)?;
        let abbr = self.y.invert(y)?;
        self.cells
            .get(&(*season, abbr.clone()))
            .and_then(|cell| self.callout_for(cell))
    }
}
