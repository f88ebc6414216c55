//! The seven JSON inputs and how they are decoded.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::{DashboardError, Result};
use crate::geo::Topology;
use crate::model::{
    HeatmapCell, MomentumPoint, ScoringMixRecord, SeasonMetric, TeamGeoStat, TeamSeasonStat,
};

/// Shares further than this from summing to one are rescaled.
pub const MIX_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKind {
    LeagueTrends,
    ScoringMix,
    TeamScatter,
    Heatmap,
    TeamMap,
    MomentumSpiral,
    StatesTopology,
}

impl DatasetKind {
    pub const ALL: [Self; 7] = [
        Self::LeagueTrends,
        Self::ScoringMix,
        Self::TeamScatter,
        Self::Heatmap,
        Self::TeamMap,
        Self::MomentumSpiral,
        Self::StatesTopology,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::LeagueTrends => "league_trends.json",
            Self::ScoringMix => "scoring_mix.json",
            Self::TeamScatter => "team_scatter.json",
            Self::Heatmap => "three_heatmap.json",
            Self::TeamMap => "team_map.json",
            Self::MomentumSpiral => "momentum_spiral.json",
            Self::StatesTopology => "us_states_topo.json",
        }
    }

    /// Path relative to the page, as fetched by the browser.
    pub fn path(self) -> String {
        format!("data/{}", self.file_name())
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Every dataset the dashboard renders, decoded.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub league_trends: Vec<SeasonMetric>,
    pub scoring_mix: Vec<ScoringMixRecord>,
    pub team_scatter: Vec<TeamSeasonStat>,
    pub heatmap: Vec<HeatmapCell>,
    pub team_map: Vec<TeamGeoStat>,
    pub momentum: Vec<MomentumPoint>,
    pub topology: Topology,
}

impl Datasets {
    /// Decodes raw JSON bodies keyed by dataset. All seven must be present
    /// and parse cleanly; an empty array only leaves its chart empty.
    pub fn from_texts(texts: impl IntoIterator<Item = (DatasetKind, String)>) -> Result<Self> {
        let mut texts: BTreeMap<DatasetKind, String> = texts.into_iter().collect();
        let mut take = |kind: DatasetKind| {
            texts.remove(&kind).ok_or_else(|| DashboardError::Fetch {
                path: kind.path(),
                reason: "not loaded".to_string(),
            })
        };

        let league_trends = parse_records(DatasetKind::LeagueTrends, &take(DatasetKind::LeagueTrends)?)?;
        let mut scoring_mix = parse_records(DatasetKind::ScoringMix, &take(DatasetKind::ScoringMix)?)?;
        let team_scatter = parse_records(DatasetKind::TeamScatter, &take(DatasetKind::TeamScatter)?)?;
        let heatmap = parse_records(DatasetKind::Heatmap, &take(DatasetKind::Heatmap)?)?;
        let team_map = parse_records(DatasetKind::TeamMap, &take(DatasetKind::TeamMap)?)?;
        let momentum = parse_records(DatasetKind::MomentumSpiral, &take(DatasetKind::MomentumSpiral)?)?;
        let topology = Topology::from_json(&take(DatasetKind::StatesTopology)?).map_err(|source| {
            DashboardError::Parse {
                kind: DatasetKind::StatesTopology,
                source,
            }
        })?;

        let normalised = normalize_mix(&mut scoring_mix);
        if normalised > 0 {
            log::warn!("normalised {normalised} scoring-mix records whose shares did not sum to 1");
        }

        Ok(Self {
            league_trends,
            scoring_mix,
            team_scatter,
            heatmap,
            team_map,
            momentum,
            topology,
        })
    }
}

/// Decodes one JSON array. An empty array is kept; its chart draws empty.
pub fn parse_records<T: DeserializeOwned>(kind: DatasetKind, text: &str) -> Result<Vec<T>> {
    let records: Vec<T> =
        serde_json::from_str(text).map_err(|source| DashboardError::Parse { kind, source })?;
    if records.is_empty() {
        log::warn!("{} has no records", kind.path());
    } else {
        log::debug!("{kind}: {} records", records.len());
    }
    Ok(records)
}

/// Rescales shares that drift from one by more than [`MIX_TOLERANCE`].
/// Records summing to zero are left alone. Returns how many were rescaled.
pub fn normalize_mix(records: &mut [ScoringMixRecord]) -> usize {
    let mut count = 0;
    for record in records.iter_mut() {
        let total = record.total();
        if total <= 0.0 || !total.is_finite() || (total - 1.0).abs() <= MIX_TOLERANCE {
            continue;
        }
        log::debug!("season {} shares sum to {total:.4}", record.season);
        record.two_pct /= total;
        record.three_pct /= total;
        record.ft_pct /= total;
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts() -> Vec<(DatasetKind, String)> {
        vec![
            (
                DatasetKind::LeagueTrends,
                r#"[{"season":2020,"avgThreeAttempts":34.6,"avgPoints":111.8,"avgThreeRate":0.384}]"#.into(),
            ),
            (
                DatasetKind::ScoringMix,
                r#"[{"season":2020,"twoPct":1.0,"threePct":0.6,"ftPct":0.4}]"#.into(),
            ),
            (
                DatasetKind::TeamScatter,
                r#"[{"season":2020,"teamId":"1","avgThreeAttempts":40.0,"threePct":0.37}]"#.into(),
            ),
            (
                DatasetKind::Heatmap,
                r#"[{"season":2020,"abbr":"BOS","threeRate":0.45,"threePct":0.37}]"#.into(),
            ),
            (
                DatasetKind::TeamMap,
                r#"[{"team":"Celtics","lat":42.36,"lon":-71.06,"threeRate":0.45,"threePct":0.37}]"#.into(),
            ),
            (
                DatasetKind::MomentumSpiral,
                r#"[{"season":2020,"momentum":1.2,"avgThreeRate":0.38,"avgThreePct":0.36}]"#.into(),
            ),
            (
                DatasetKind::StatesTopology,
                r#"{"type":"Topology","arcs":[],"objects":{}}"#.into(),
            ),
        ]
    }

    #[test]
    fn paths_live_under_data() {
        assert_eq!(DatasetKind::Heatmap.path(), "data/three_heatmap.json");
        assert_eq!(DatasetKind::StatesTopology.path(), "data/us_states_topo.json");
    }

    #[test]
    fn decodes_all_seven_and_normalises_mix() {
        let datasets = Datasets::from_texts(texts()).unwrap();
        let mix = &datasets.scoring_mix[0];
        assert!((mix.total() - 1.0).abs() < 1e-9);
        assert!((mix.two_pct - 0.5).abs() < 1e-9);
        assert_eq!(datasets.team_map[0].off_rtg, None);
    }

    #[test]
    fn missing_dataset_aborts() {
        let texts = texts()
            .into_iter()
            .filter(|(kind, _)| *kind != DatasetKind::Heatmap);
        let error = Datasets::from_texts(texts).unwrap_err();
        assert!(matches!(error, DashboardError::Fetch { ref path, .. } if path == "data/three_heatmap.json"));
    }

    #[test]
    fn malformed_json_names_the_dataset() {
        let error = parse_records::<SeasonMetric>(DatasetKind::LeagueTrends, "{").unwrap_err();
        assert!(error.to_string().contains("league_trends.json"));
    }

    #[test]
    fn empty_dataset_is_kept() {
        let points = parse_records::<MomentumPoint>(DatasetKind::MomentumSpiral, "[]").unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn empty_team_map_does_not_abort_the_rest() {
        let texts = texts().into_iter().map(|(kind, text)| {
            if kind == DatasetKind::TeamMap {
                (kind, "[]".to_string())
            } else {
                (kind, text)
            }
        });
        let datasets = Datasets::from_texts(texts).unwrap();
        assert!(datasets.team_map.is_empty());
        assert_eq!(datasets.league_trends.len(), 1);

        let chart = crate::charts::TeamMapChart::new(datasets.team_map, None, 600.0);
        assert!(chart.teams().is_empty());
    }

    #[test]
    fn near_unit_and_zero_sums_are_left_alone() {
        let mut records = vec![
            ScoringMixRecord { season: 2019, two_pct: 0.5, three_pct: 0.3, ft_pct: 0.203 },
            ScoringMixRecord { season: 2020, two_pct: 0.0, three_pct: 0.0, ft_pct: 0.0 },
        ];
        assert_eq!(normalize_mix(&mut records), 0);
        assert!((records[0].ft_pct - 0.203).abs() < f64::EPSILON);
    }
}
