use beyond_the_arc_core::charts::{Chart, ChartControl, HeatmapChart, TeamScatterChart, TrendChart};
use beyond_the_arc_core::dataset::{parse_records, DatasetKind};
use beyond_the_arc_core::join::BoundLayer;
use beyond_the_arc_core::model::{HeatmapCell, SeasonMetric, TeamSeasonStat};
use beyond_the_arc_core::story::{StepSpec, StoryController, StoryGroup, StoryTarget};
use beyond_the_arc_core::{hero_metrics, Dashboard};

const LEAGUE_TRENDS: &str = r#"[
    {"season": 2020, "avgThreeAttempts": 34.6, "avgPoints": 111.8, "avgThreeRate": 0.36},
    {"season": 2015, "avgThreeAttempts": 22.4, "avgPoints": 100.0, "avgThreeRate": 0.30}
]"#;

const TEAM_SCATTER: &str = r#"[
    {"season": 2019, "teamId": "1", "city": "Golden State", "team": "Warriors", "abbr": "GSW",
     "conference": "West", "avgThreeAttempts": 34.4, "threePct": 0.385, "winPct": 0.695},
    {"season": 2019, "teamId": "2", "city": "Houston", "team": "Rockets", "abbr": "HOU",
     "conference": "West", "avgThreeAttempts": 45.4, "threePct": 0.355},
    {"season": 2020, "teamId": "2", "city": "Houston", "team": "Rockets", "abbr": "HOU",
     "conference": "West", "avgThreeAttempts": 45.3, "threePct": 0.348, "winPct": 0.611}
]"#;

const HEATMAP: &str = r#"[
    {"season": 2019, "abbr": "BOS", "threeRate": 0.40, "threePct": 0.36},
    {"season": 2020, "abbr": "BOS", "threeRate": 0.41, "threePct": 0.36},
    {"season": 2020, "abbr": "MIL", "threeRate": 0.43, "threePct": 0.35},
    {"season": 2020, "abbr": "LAL", "threeRate": 0.41, "threePct": 0.34},
    {"season": 2019, "abbr": "SEA", "threeRate": 0.50, "threePct": 0.34}
]"#;

#[test]
fn growth_is_computed_from_unsorted_trends() {
    let records: Vec<SeasonMetric> = parse_records(DatasetKind::LeagueTrends, LEAGUE_TRENDS).unwrap();
    let metrics = hero_metrics(&records).unwrap();
    assert!((metrics.growth - 20.0).abs() < 1e-9);
    assert_eq!(metrics.growth_label(), "+20.0%");
}

#[test]
fn metric_filter_then_focus_limits_tooltip_to_that_metric() {
    let records: Vec<SeasonMetric> = parse_records(DatasetKind::LeagueTrends, LEAGUE_TRENDS).unwrap();
    let mut chart = TrendChart::new(records, 720.0);

    chart.set_metric("avgPoints");
    let callout = chart.focus_season(2020).unwrap();

    assert_eq!(callout.content.title, "2020");
    assert_eq!(callout.content.rows, vec![("Points per game".to_string(), "111.8".to_string())]);
}

#[test]
fn scatter_season_update_is_idempotent() {
    let records: Vec<TeamSeasonStat> = parse_records(DatasetKind::TeamScatter, TEAM_SCATTER).unwrap();
    let mut chart = TeamScatterChart::new(records, 720.0);
    let mut bound = BoundLayer::default();

    chart.set_season(2019);
    let first = chart.scene();
    bound.join(&first.layer("points").unwrap().nodes);
    let keys = bound.keys();

    chart.set_season(2019);
    let second = chart.scene();
    let plan = bound.join(&second.layer("points").unwrap().nodes);

    assert!(plan.is_noop());
    assert_eq!(bound.keys(), keys);
    assert_eq!(bound.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn missing_win_pct_uses_midpoint_and_na_label() {
    let records: Vec<TeamSeasonStat> = parse_records(DatasetKind::TeamScatter, TEAM_SCATTER).unwrap();
    let mut chart = TeamScatterChart::new(records.clone(), 720.0);

    let rockets = &records[1];
    assert!((rockets.win_pct_or_default() - 0.5).abs() < f64::EPSILON);
    let callout = chart
        .highlight(&beyond_the_arc_core::charts::HighlightRequest {
            team: Some("Rockets".to_string()),
            season: Some(2019),
        })
        .unwrap();
    assert_eq!(callout.content.value_of("Win %"), Some("N/A"));
}

#[test]
fn heatmap_rows_follow_latest_season_rate_with_stable_ties() {
    let cells: Vec<HeatmapCell> = parse_records(DatasetKind::Heatmap, HEATMAP).unwrap();
    let chart = HeatmapChart::new(cells, 720.0);
    assert_eq!(chart.team_order(), vec!["MIL", "BOS", "LAL", "SEA"]);
}

#[test]
fn story_step_drives_mounted_chart_through_dashboard() {
    let records: Vec<SeasonMetric> = parse_records(DatasetKind::LeagueTrends, LEAGUE_TRENDS).unwrap();
    let mut dashboard = Dashboard::new();
    dashboard.insert(StoryTarget::Trend, Box::new(TrendChart::new(records, 720.0)));

    let attrs = |pairs: &'static [(&'static str, &'static str)]| {
        StepSpec::from_attributes(move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
        })
    };
    let mut story = StoryController::new();
    let group = story.add_group(StoryGroup::new(
        vec![
            attrs(&[("data-story", "trend")]),
            attrs(&[("data-story", "trend"), ("data-metric", "avgPoints"), ("data-season", "2015")]),
        ],
        None,
    ));

    let commands = story.activate(group, 1).unwrap();
    let callout = dashboard.apply_all(&commands).unwrap();
    assert_eq!(callout.content.title, "2015");
    assert_eq!(callout.content.rows.len(), 1);

    assert!(story.activate(group, 1).is_none());
}
