use std::path::{Path, PathBuf};

use beyond_the_arc_core::charts::{
    Chart, HeatmapChart, MomentumSpiralChart, ScoringMixChart, TeamMapChart, TeamScatterChart,
    TrendChart,
};
use beyond_the_arc_core::dataset::Datasets;
use beyond_the_arc_core::story::StoryTarget;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot create {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

fn build(target: StoryTarget, datasets: &Datasets, width: f64) -> Box<dyn Chart> {
    match target {
        StoryTarget::Trend => Box::new(TrendChart::new(datasets.league_trends.clone(), width)),
        StoryTarget::Mix => Box::new(ScoringMixChart::new(datasets.scoring_mix.clone(), width)),
        StoryTarget::Scatter => {
            Box::new(TeamScatterChart::new(datasets.team_scatter.clone(), width))
        }
        StoryTarget::Heatmap => Box::new(HeatmapChart::new(datasets.heatmap.clone(), width)),
        StoryTarget::Map => Box::new(TeamMapChart::new(
            datasets.team_map.clone(),
            Some(&datasets.topology),
            width,
        )),
        StoryTarget::Spiral => {
            Box::new(MomentumSpiralChart::new(datasets.momentum.clone(), width))
        }
    }
}

/// Writes one `<chart>.svg` per chart into `out_dir` in its initial state.
pub async fn write_snapshots(
    datasets: &Datasets,
    width: f64,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, SnapshotError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|source| SnapshotError::CreateDir {
            path: out_dir.display().to_string(),
            source,
        })?;

    let mut written = Vec::with_capacity(StoryTarget::ALL.len());
    for target in StoryTarget::ALL {
        let svg = build(target, datasets, width).scene().to_svg();
        let path = out_dir.join(format!("{}.svg", target.as_str()));
        tokio::fs::write(&path, svg)
            .await
            .map_err(|source| SnapshotError::Write {
                path: path.display().to_string(),
                source,
            })?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
