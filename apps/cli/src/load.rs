use std::path::Path;

use beyond_the_arc_core::dataset::{DatasetKind, Datasets};
use beyond_the_arc_core::error::{DashboardError, Result};

async fn read(dir: &Path, kind: DatasetKind) -> Result<(DatasetKind, String)> {
    let path = dir.join(kind.file_name());
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|error| DashboardError::Fetch {
            path: path.display().to_string(),
            reason: error.to_string(),
        })?;
    log::debug!("read {}", path.display());
    Ok((kind, text))
}

/// Reads all seven files concurrently; any failure fails the whole load.
pub async fn load_datasets(dir: &Path) -> Result<Datasets> {
    let (trends, mix, scatter, heatmap, map, spiral, topology) = tokio::try_join!(
        read(dir, DatasetKind::LeagueTrends),
        read(dir, DatasetKind::ScoringMix),
        read(dir, DatasetKind::TeamScatter),
        read(dir, DatasetKind::Heatmap),
        read(dir, DatasetKind::TeamMap),
        read(dir, DatasetKind::MomentumSpiral),
        read(dir, DatasetKind::StatesTopology),
    )?;
    Datasets::from_texts([trends, mix, scatter, heatmap, map, spiral, topology])
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const FIXTURES: [(DatasetKind, &str); 7] = [
        (
            DatasetKind::LeagueTrends,
            r#"[{"season":2015,"avgThreeAttempts":22.4,"avgPoints":100.0,"avgThreeRate":0.30},
                {"season":2020,"avgThreeAttempts":34.6,"avgPoints":111.8,"avgThreeRate":0.36,
                 "avgThreePct":0.359,"teamGames":2460}]"#,
        ),
        (
            DatasetKind::ScoringMix,
            r#"[{"season":2015,"twoPct":0.6,"threePct":0.24,"ftPct":0.16},
                {"season":2020,"twoPct":0.5,"threePct":0.33,"ftPct":0.17}]"#,
        ),
        (
            DatasetKind::TeamScatter,
            r#"[{"season":2020,"teamId":"1","city":"Houston","team":"Rockets","abbr":"HOU",
                 "conference":"West","avgThreeAttempts":45.3,"threePct":0.348,"winPct":0.611},
                {"season":2020,"teamId":"2","city":"Boston","team":"Celtics","abbr":"BOS",
                 "conference":"East","avgThreeAttempts":38.0,"threePct":0.364}]"#,
        ),
        (
            DatasetKind::Heatmap,
            r#"[{"season":2020,"abbr":"HOU","threeRate":0.52,"threePct":0.35},
                {"season":2020,"abbr":"BOS","threeRate":0.41,"threePct":0.36}]"#,
        ),
        (
            DatasetKind::TeamMap,
            r#"[{"team":"Rockets","city":"Houston","conference":"West","lat":29.75,"lon":-95.36,
                 "offRtg":113.1,"threeRate":0.52,"threePct":0.35}]"#,
        ),
        (
            DatasetKind::MomentumSpiral,
            r#"[{"season":2015,"momentum":0.4,"avgThreeRate":0.30,"avgThreePct":0.35},
                {"season":2020,"momentum":1.1,"avgThreeRate":0.36,"avgThreePct":0.36}]"#,
        ),
        (
            DatasetKind::StatesTopology,
            r#"{"type":"Topology","arcs":[[[-124.7,48.4],[-67.0,44.8],[-80.2,25.8],[-124.7,48.4]]],
                "objects":{"states":{"type":"GeometryCollection","geometries":[
                  {"type":"Polygon","id":"US","arcs":[[0]]}]}}}"#,
        ),
    ];

    pub(crate) fn write_fixtures(dir: &Path) {
        for (kind, text) in FIXTURES {
            std::fs::write(dir.join(kind.file_name()), text).unwrap();
        }
    }

    #[tokio::test]
    async fn loads_every_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());

        let datasets = load_datasets(dir.path()).await.unwrap();
        assert_eq!(datasets.league_trends.len(), 2);
        assert_eq!(datasets.team_scatter[1].win_pct, None);
    }

    #[tokio::test]
    async fn missing_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        std::fs::remove_file(dir.path().join("team_map.json")).unwrap();

        let error = load_datasets(dir.path()).await.unwrap_err();
        assert!(error.to_string().contains("team_map.json"));
    }
}
