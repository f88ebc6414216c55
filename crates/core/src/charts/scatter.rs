use std::collections::BTreeMap;

use crate::charts::{axis_bottom, axis_left, Chart, ChartControl, HighlightRequest, Margins, Size};
use crate::color::conference_color;
use crate::format;
use crate::model::{Conference, TeamSeasonStat};
use crate::scale::{extent, LinearScale};
use crate::scene::{num, Layer, Node, Scene};
use crate::tooltip::{Callout, TooltipContent};

pub const HEIGHT: f64 = 420.0;
const RADIUS_RANGE: (f64, f64) = (4.0, 16.0);
const HIT_SLACK: f64 = 4.0;

/// Team 3PA volume against accuracy for one season at a time.
///
/// Axes span every season so a team's dot moves comparably between seasons.
/// Dots are keyed by team, which lets season changes animate instead of
/// redrawing.
#[derive(Debug, Clone)]
pub struct TeamScatterChart {
    by_season: BTreeMap<i32, Vec<TeamSeasonStat>>,
    size: Size,
    margins: Margins,
    x: LinearScale,
    y: LinearScale,
    radius: LinearScale,
    season: Option<i32>,
    highlighted: Option<String>,
    conference: Option<Conference>,
}

impl TeamScatterChart {
    pub fn new(records: Vec<TeamSeasonStat>, width: f64) -> Self {
        let size = Size::new(width, HEIGHT);
        let margins = Margins::STANDARD;
        let x_domain = extent(records.iter().map(|r| r.avg_three_attempts)).unwrap_or((0.0, 1.0));
        let y_domain = extent(records.iter().map(|r| r.three_pct)).unwrap_or((0.0, 1.0));

        let mut by_season: BTreeMap<i32, Vec<TeamSeasonStat>> = BTreeMap::new();
        for record in records {
            by_season.entry(record.season).or_default().push(record);
        }
        let season = by_season.keys().next_back().copied();

        Self {
            by_season,
            size,
            margins,
            x: LinearScale::new(x_domain, margins.x_range(size)).padded(0.1),
            y: LinearScale::new(y_domain, margins.y_range(size)).padded(0.1),
            radius: LinearScale::new((0.0, 1.0), RADIUS_RANGE),
            season,
            highlighted: None,
            conference: None,
        }
    }

    pub fn seasons(&self) -> Vec<i32> {
        self.by_season.keys().copied().collect()
    }

    pub const fn season(&self) -> Option<i32> {
        self.season
    }

    pub fn highlighted(&self) -> Option<&TeamSeasonStat> {
        let key = self.highlighted.as_deref()?;
        self.current().iter().find(|record| record.key() == key)
    }

    pub fn current(&self) -> &[TeamSeasonStat] {
        self.season
            .and_then(|season| self.by_season.get(&season))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The requested season, or the closest one with data (later wins ties).
    pub fn nearest_season(&self, season: i32) -> Option<i32> {
        self.by_season
            .keys()
            .copied()
            .min_by_key(|candidate| ((candidate - season).abs(), -candidate))
    }

    pub fn radius_of(&self, record: &TeamSeasonStat) -> f64 {
        self.radius.map(record.win_pct_or_default().clamp(0.0, 1.0))
    }

    fn position(&self, record: &TeamSeasonStat) -> (f64, f64) {
        (
            self.x.map(record.avg_three_attempts),
            self.y.map(record.three_pct),
        )
    }

    fn callout_for(&self, record: &TeamSeasonStat) -> Callout {
        let name = record.display_name();
        let title = if name.is_empty() { record.key() } else { name };
        let mut content = TooltipContent::new(format!("{title} · {}", record.season))
            .row("3PA per game", format::number(record.avg_three_attempts, 1))
            .row("3P%", format::percent(record.three_pct, 1))
            .row("Win %", format::optional(record.win_pct, |v| format::percent(v, 1)));
        if let Some(rate) = record.three_rate {
            content = content.row("3PA rate", format::percent(rate, 1));
        }
        if let Some(standing) = record.standing() {
            let standing = match record.games_played {
                Some(games) => format!("{standing} ({games} GP)"),
                None => standing,
            };
            content = content.row("Record", standing);
        }
        let (x, y) = self.position(record);
        Callout { content, x, y }
    }

    pub fn insight(&self) -> String {
        let Some(season) = self.season else {
            return String::new();
        };
        if let Some(team) = self.highlighted() {
            return format!(
                "{} attempted {} threes per game in {season}, hitting {} with a {} win rate.",
                team.display_name(),
                format::number(team.avg_three_attempts, 1),
                format::percent(team.three_pct, 1),
                format::optional(team.win_pct, |v| format::percent(v, 1)),
            );
        }
        let teams = self.current();
        let leader = teams
            .iter()
            .max_by(|a, b| a.avg_three_attempts.total_cmp(&b.avg_three_attempts));
        match leader {
            Some(leader) => format!(
                "{} teams in {season}; {} led the league at {} 3PA per game.",
                teams.len(),
                leader.display_name(),
                format::number(leader.avg_three_attempts, 1),
            ),
            None => format!("No team data for {season}."),
        }
    }

    fn opacity(&self, record: &TeamSeasonStat) -> f64 {
        if self
            .conference
            .is_some_and(|conference| record.conference() != Some(conference))
        {
            return 0.15;
        }
        match self.highlighted.as_deref() {
            Some(key) if key != record.key() => 0.35,
            _ => 0.85,
        }
    }
}

impl ChartControl for TeamScatterChart {
    fn set_season(&mut self, season: i32) -> Option<Callout> {
        self.season = self.nearest_season(season);
        self.highlighted().map(|record| self.callout_for(record))
    }

    fn highlight(&mut self, request: &HighlightRequest) -> Option<Callout> {
        if let Some(season) = request.season {
            self.season = self.nearest_season(season);
        }
        let query = request.team.as_deref()?;
        self.highlighted = self
            .current()
            .iter()
            .find(|record| record.matches(query))
            .map(TeamSeasonStat::key);
        if self.highlighted.is_none() {
            log::warn!("team {query:?} not found in season {:?}", self.season);
        }
        self.highlighted().map(|record| self.callout_for(record))
    }

    fn focus_conference(&mut self, conference: &str) -> Option<Callout> {
        self.conference = Conference::parse(conference);
        None
    }
}

impl Chart for TeamScatterChart {
    fn scene(&self) -> Scene {
        let mut scene = Scene::new("scatter-chart", self.size.width, self.size.height);
        let inner = self.margins.inner(self.size);
        let baseline = self.margins.top + inner.height;

        let mut axes = Layer::new("axes");
        axes.nodes.extend(axis_bottom(&self.x, &self.x.ticks(6), baseline, |tick| {
            format::number(tick, 0)
        }));
        axes.nodes.extend(axis_left(
            &self.y,
            &self.y.ticks(5),
            self.margins.left,
            inner.width,
            |tick| format::percent(tick, 0),
        ));
        axes.push(
            Node::new("text")
                .class("axis-title")
                .num("x", self.margins.left + inner.width)
                .num("y", baseline + 34.0)
                .attr("text-anchor", "end")
                .text("3PA per game"),
        );
        axes.push(
            Node::new("text")
                .class("axis-title")
                .num("x", self.margins.left)
                .num("y", self.margins.top - 8.0)
                .text("3P%"),
        );
        scene.push(axes);

        let mut points = Layer::keyed("points");
        let highlighted = self.highlighted.as_deref();
        for record in self.current() {
            let (x, y) = self.position(record);
            let key = record.key();
            let class = if highlighted == Some(key.as_str()) {
                "team-dot is-highlighted"
            } else {
                "team-dot"
            };
            points.push(
                Node::new("circle")
                    .key(key)
                    .class(class)
                    .num("cx", x)
                    .num("cy", y)
                    .num("r", self.radius_of(record))
                    .attr("fill", conference_color(record.conference()))
                    .num("opacity", self.opacity(record))
                    .on_enter("r", "0")
                    .on_exit("r", "0"),
            );
        }
        scene.push(points);

        let mut labels = Layer::new("labels");
        if let Some(record) = self.highlighted() {
            let (x, y) = self.position(record);
            labels.push(
                Node::new("text")
                    .class("team-label")
                    .num("x", x)
                    .attr("y", num(y - self.radius_of(record) - 6.0))
                    .attr("text-anchor", "middle")
                    .text(record.abbr.clone().unwrap_or_else(|| record.team().to_string())),
            );
        }
        scene.push(labels);
        scene
    }

    fn hover(&self, x: f64, y: f64) -> Option<Callout> {
        self.current()
            .iter()
            .map(|record| {
                let (cx, cy) = self.position(record);
                (record, (cx - x).hypot(cy - y))
            })
            .filter(|(record, distance)| *distance <= self.radius_of(record) + HIT_SLACK)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(record, _)| self.callout_for(record))
    }

    fn annotations(&self) -> Vec<(&'static str, String)> {
        let season = self.season.map(|s| s.to_string()).unwrap_or_default();
        vec![("seasonLabel", season), ("teamInsight", self.insight())]
    }
}
