use crate::charts::{Chart, ChartControl, HighlightRequest, Size};
use crate::color::conference_color;
use crate::format;
use crate::geo::{AlbersUsa, Shape, Topology};
use crate::model::{Conference, TeamGeoStat};
use crate::scale::{extent, LinearScale, SqrtScale};
use crate::scene::{Layer, Node, Scene};
use crate::tooltip::{Callout, TooltipContent};

pub const HEIGHT: f64 = 480.0;
const PADDING: f64 = 16.0;
const RADIUS_RANGE: (f64, f64) = (4.0, 18.0);
const OPACITY_RANGE: (f64, f64) = (0.35, 0.95);
const HIT_SLACK: f64 = 3.0;

/// Teams placed on a US basemap: area encodes offensive rating, opacity
/// encodes three-point rate.
#[derive(Debug, Clone)]
pub struct TeamMapChart {
    teams: Vec<TeamGeoStat>,
    states: Vec<Shape>,
    projection: AlbersUsa,
    radius: SqrtScale,
    opacity: LinearScale,
    size: Size,
    conference: Option<Conference>,
    highlighted: Option<usize>,
}

impl TeamMapChart {
    /// Without a usable topology the map falls back to a centred projection
    /// and draws the teams alone.
    pub fn new(teams: Vec<TeamGeoStat>, topology: Option<&Topology>, width: f64) -> Self {
        let size = Size::new(width, HEIGHT);
        let states = match topology.map(|topology| topology.shapes(Some("states"))) {
            Some(Ok(shapes)) => shapes,
            Some(Err(error)) => {
                log::warn!("basemap unavailable: {error}");
                Vec::new()
            }
            None => Vec::new(),
        };
        let projection = if states.is_empty() {
            AlbersUsa::centered(size.width, size.height)
        } else {
            AlbersUsa::fitted(
                size.width,
                size.height,
                PADDING,
                states.iter().flat_map(Shape::points),
            )
        };

        let rating = extent(teams.iter().filter_map(|team| team.off_rtg)).unwrap_or((0.0, 1.0));
        let rate = extent(teams.iter().map(|team| team.three_rate)).unwrap_or((0.0, 1.0));

        Self {
            teams,
            states,
            projection,
            radius: SqrtScale::new(rating, RADIUS_RANGE),
            opacity: LinearScale::new(rate, OPACITY_RANGE),
            size,
            conference: None,
            highlighted: None,
        }
    }

    pub fn has_basemap(&self) -> bool {
        !self.states.is_empty()
    }

    pub fn teams(&self) -> &[TeamGeoStat] {
        &self.teams
    }

    /// Teams without a rating are drawn at the smallest radius.
    pub fn radius_of(&self, team: &TeamGeoStat) -> f64 {
        team.off_rtg
            .map_or(RADIUS_RANGE.0, |rating| self.radius.map(rating))
            .clamp(RADIUS_RANGE.0, RADIUS_RANGE.1)
    }

    pub fn position_of(&self, team: &TeamGeoStat) -> (f64, f64) {
        self.projection.project((team.lon, team.lat))
    }

    fn key_of(index: usize, team: &TeamGeoStat) -> String {
        let name = team.display_name();
        if name.is_empty() {
            format!("team-{index}")
        } else {
            name
        }
    }

    fn callout_for(&self, team: &TeamGeoStat) -> Callout {
        let (x, y) = self.position_of(team);
        let conference = team.conference().map_or(format::NOT_AVAILABLE, Conference::as_str);
        Callout {
            content: TooltipContent::new(team.display_name())
                .row("Offensive rating", format::optional(team.off_rtg, |v| format::number(v, 1)))
                .row("3PA rate", format::percent(team.three_rate, 1))
                .row("3P%", format::percent(team.three_pct, 1))
                .row("Conference", conference),
            x,
            y,
        }
    }

    fn is_dimmed(&self, index: usize, team: &TeamGeoStat) -> bool {
        self.conference
            .is_some_and(|conference| team.conference() != Some(conference))
            || self.highlighted.is_some_and(|highlighted| highlighted != index)
    }
}

impl ChartControl for TeamMapChart {
    fn highlight(&mut self, request: &HighlightRequest) -> Option<Callout> {
        let query = request.team.as_deref()?;
        self.highlighted = self.teams.iter().position(|team| team.matches(query));
        if self.highlighted.is_none() {
            log::warn!("map has no team matching {query:?}");
        }
        self.highlighted
            .map(|index| self.callout_for(&self.teams[index]))
    }

    fn focus_conference(&mut self, conference: &str) -> Option<Callout> {
        self.conference = Conference::parse(conference);
        None
    }
}

impl Chart for TeamMapChart {
    fn scene(&self) -> Scene {
        let mut scene = Scene::new("map-chart", self.size.width, self.size.height);

        let basemap = Layer::new("basemap").with(self.states.iter().map(|shape| {
            let node = Node::new("path")
                .class("state")
                .attr("d", self.projection.path(shape));
            match &shape.id {
                Some(id) => node.attr("data-state", id.clone()),
                None => node,
            }
        }));
        scene.push(basemap);

        let mut teams = Layer::keyed("teams");
        for (index, team) in self.teams.iter().enumerate() {
            let (x, y) = self.position_of(team);
            let opacity = if self.is_dimmed(index, team) {
                0.1
            } else {
                self.opacity.map(team.three_rate)
            };
            let class = if self.highlighted == Some(index) {
                "team-bubble is-highlighted"
            } else {
                "team-bubble"
            };
            teams.push(
                Node::new("circle")
                    .key(Self::key_of(index, team))
                    .class(class)
                    .num("cx", x)
                    .num("cy", y)
                    .num("r", self.radius_of(team))
                    .attr("fill", conference_color(team.conference()))
                    .num("fill-opacity", opacity)
                    .on_enter("r", "0"),
            );
        }
        scene.push(teams);
        scene
    }

    fn hover(&self, x: f64, y: f64) -> Option<Callout> {
        self.teams
            .iter()
            .map(|team| {
                let (cx, cy) = self.position_of(team);
                (team, (cx - x).hypot(cy - y))
            })
            .filter(|(team, distance)| *distance <= self.radius_of(team) + HIT_SLACK)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(team, _)| self.callout_for(team))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, conference: &str, lat: f64, lon: f64, rating: Option<f64>) -> TeamGeoStat {
        TeamGeoStat {
            team: Some(name.to_string()),
            city: None,
            conference: Some(conference.to_string()),
            lat,
            lon,
            off_rtg: rating,
            three_rate: 0.4,
            three_pct: 0.36,
        }
    }

    fn teams() -> Vec<TeamGeoStat> {
        vec![
            team("Celtics", "East", 42.36, -71.06, Some(118.0)),
            team("Lakers", "West", 34.04, -118.27, Some(110.0)),
            team("Jazz", "West", 40.77, -111.9, None),
        ]
    }

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "arcs": [[[-124.7, 48.4], [-67.0, 44.8], [-80.2, 25.8], [-117.1, 32.7], [-124.7, 48.4]]],
        "objects": {"states": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "id": "US", "arcs": [[0]]}
        ]}}
    }"#;

    #[test]
    fn missing_rating_is_smallest_and_excluded_from_extent() {
        let chart = TeamMapChart::new(teams(), None, 800.0);
        let jazz = &chart.teams()[2];
        assert!((chart.radius_of(jazz) - RADIUS_RANGE.0).abs() < 1e-9);
        assert!((chart.radius_of(&chart.teams()[0]) - RADIUS_RANGE.1).abs() < 1e-9);
        assert!((chart.radius_of(&chart.teams()[1]) - RADIUS_RANGE.0).abs() < 1e-9);

        let callout = chart.hover(chart.position_of(jazz).0, chart.position_of(jazz).1);
        assert_eq!(
            callout.and_then(|c| c.content.value_of("Offensive rating").map(str::to_string)),
            Some("N/A".to_string())
        );
    }

    #[test]
    fn without_basemap_uses_centered_projection() {
        let chart = TeamMapChart::new(teams(), None, 800.0);
        assert!(!chart.has_basemap());
        assert!(chart.scene().layer("basemap").is_some_and(|l| l.nodes.is_empty()));
    }

    #[test]
    fn basemap_fits_teams_inside_surface() {
        let topology = Topology::from_json(TOPOLOGY).unwrap();
        let chart = TeamMapChart::new(teams(), Some(&topology), 800.0);
        assert!(chart.has_basemap());
        for team in chart.teams() {
            let (x, y) = chart.position_of(team);
            assert!((0.0..=800.0).contains(&x));
            assert!((0.0..=HEIGHT).contains(&y));
        }
        let scene = chart.scene();
        assert_eq!(scene.layer("basemap").map(|l| l.nodes.len()), Some(1));
    }

    #[test]
    fn conference_focus_dims_other_teams() {
        let mut chart = TeamMapChart::new(teams(), None, 800.0);
        chart.focus_conference("West");
        let scene = chart.scene();
        let bubbles = scene.layer("teams").unwrap();
        assert_eq!(bubbles.find("Celtics").and_then(|n| n.get("fill-opacity")), Some("0.1"));
        assert_eq!(bubbles.find("Lakers").and_then(|n| n.get("fill-opacity")), Some("0.65"));
    }

    #[test]
    fn highlight_returns_team_callout() {
        let mut chart = TeamMapChart::new(teams(), None, 800.0);
        let callout = chart.highlight(&HighlightRequest {
            team: Some("lakers".to_string()),
            season: None,
        });
        assert_eq!(callout.map(|c| c.content.title), Some("Lakers".to_string()));
    }
}
