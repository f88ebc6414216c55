use beyond_the_arc_core::charts::heatmap::team_order;
use beyond_the_arc_core::dataset::Datasets;
use beyond_the_arc_core::format;
use beyond_the_arc_core::model::MixShare;
use beyond_the_arc_core::{hero_metrics, HeroMetrics};
use color_eyre::Result;
use serde::Serialize;

const TOP_TEAMS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlessSummary {
    generated_at: String,
    seasons: Option<(i32, i32)>,
    hero: Option<HeroMetrics>,
    latest_league: Option<LeagueSeason>,
    latest_mix: Option<MixSummary>,
    top_three_rate: Vec<TeamRate>,
    scatter_leader: Option<TeamRate>,
    mapped_teams: usize,
    teams_without_rating: usize,
    peak_momentum: Option<(i32, f64)>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeagueSeason {
    season: i32,
    three_pct: Option<f64>,
    team_games: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MixSummary {
    season: i32,
    two_pct: f64,
    three_pct: f64,
    ft_pct: f64,
}

#[derive(Debug, Serialize)]
struct TeamRate {
    team: String,
    value: f64,
}

pub fn build_summary(datasets: &Datasets) -> HeadlessSummary {
    let seasons = datasets
        .league_trends
        .iter()
        .map(|record| record.season)
        .fold(None, |range: Option<(i32, i32)>, season| {
            Some(range.map_or((season, season), |(lo, hi)| (lo.min(season), hi.max(season))))
        });

    let latest_league = datasets
        .league_trends
        .iter()
        .max_by_key(|record| record.season)
        .map(|record| LeagueSeason {
            season: record.season,
            three_pct: record.avg_three_pct,
            team_games: record.team_games,
        });

    let latest_mix = datasets
        .scoring_mix
        .iter()
        .max_by_key(|record| record.season)
        .map(|record| MixSummary {
            season: record.season,
            two_pct: record.share(MixShare::Two),
            three_pct: record.share(MixShare::Three),
            ft_pct: record.share(MixShare::FreeThrow),
        });

    let latest_heatmap = datasets.heatmap.iter().map(|cell| cell.season).max();
    let top_three_rate = team_order(&datasets.heatmap)
        .into_iter()
        .filter_map(|abbr| {
            datasets
                .heatmap
                .iter()
                .find(|cell| cell.abbr == abbr && Some(cell.season) == latest_heatmap)
                .map(|cell| {
                    let name = cell.display_name();
                    TeamRate {
                        team: if name.is_empty() { abbr.clone() } else { name },
                        value: cell.three_rate,
                    }
                })
        })
        .take(TOP_TEAMS)
        .collect();

    let latest_scatter = datasets.team_scatter.iter().map(|r| r.season).max();
    let scatter_leader = datasets
        .team_scatter
        .iter()
        .filter(|record| Some(record.season) == latest_scatter)
        .max_by(|a, b| a.avg_three_attempts.total_cmp(&b.avg_three_attempts))
        .map(|record| TeamRate {
            team: record.display_name(),
            value: record.avg_three_attempts,
        });

    let peak_momentum = datasets
        .momentum
        .iter()
        .max_by(|a, b| a.momentum.total_cmp(&b.momentum))
        .map(|point| (point.season, point.momentum));

    HeadlessSummary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        seasons,
        hero: hero_metrics(&datasets.league_trends),
        latest_league,
        latest_mix,
        top_three_rate,
        scatter_leader,
        mapped_teams: datasets.team_map.len(),
        teams_without_rating: datasets
            .team_map
            .iter()
            .filter(|team| team.off_rtg.is_none())
            .count(),
        peak_momentum,
    }
}

pub fn render_text(summary: &HeadlessSummary) -> String {
    let mut lines = vec![
        "\nBeyond the Arc".to_string(),
        "==============".to_string(),
    ];
    if let Some((first, last)) = summary.seasons {
        lines.push(format!("Seasons: {first}-{last}"));
    }
    if let Some(hero) = &summary.hero {
        lines.push(format!(
            "3PA rate: {} -> {} ({})",
            format::percent(hero.first_rate, 1),
            format::percent(hero.last_rate, 1),
            hero.growth_label()
        ));
    }
    if let Some(league) = &summary.latest_league {
        let games = league
            .team_games
            .map(|games| format!(" over {} team games", format::number(f64::from(games), 0)))
            .unwrap_or_default();
        lines.push(format!(
            "League 3P%, {}: {}{games}",
            league.season,
            format::optional(league.three_pct, |pct| format::percent(pct, 1))
        ));
    }

    if let Some(mix) = &summary.latest_mix {
        lines.push(format!("\nScoring mix, {}:", mix.season));
        lines.push(format!("- Two-pointers: {}", format::percent(mix.two_pct, 1)));
        lines.push(format!("- Three-pointers: {}", format::percent(mix.three_pct, 1)));
        lines.push(format!("- Free throws: {}", format::percent(mix.ft_pct, 1)));
    }

    lines.push("\nHighest three-point rate:".to_string());
    for team in &summary.top_three_rate {
        lines.push(format!("- {} | {}", team.team, format::percent(team.value, 1)));
    }

    if let Some(leader) = &summary.scatter_leader {
        lines.push(format!(
            "\nMost 3PA per game: {} ({})",
            leader.team,
            format::number(leader.value, 1)
        ));
    }
    lines.push(format!(
        "Mapped teams: {} ({} without offensive rating)",
        summary.mapped_teams, summary.teams_without_rating
    ));
    if let Some((season, momentum)) = summary.peak_momentum {
        lines.push(format!("Peak momentum: {season} ({})", format::number(momentum, 2)));
    }
    lines.join("\n")
}

pub fn render_json(summary: &HeadlessSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

#[cfg(test)]
mod tests {
    use beyond_the_arc_core::dataset::Datasets;

    use super::*;
    use crate::load::tests::FIXTURES;

    fn datasets() -> Datasets {
        Datasets::from_texts(FIXTURES.map(|(kind, text)| (kind, text.to_string()))).unwrap()
    }

    #[test]
    fn summary_reports_growth_and_leaders() {
        let summary = build_summary(&datasets());
        assert_eq!(summary.seasons, Some((2015, 2020)));
        assert_eq!(summary.hero.as_ref().map(HeroMetrics::growth_label).as_deref(), Some("+20.0%"));
        assert_eq!(summary.top_three_rate[0].team, "HOU");
        assert_eq!(summary.scatter_leader.as_ref().map(|t| t.team.as_str()), Some("Houston Rockets"));
        assert_eq!(summary.teams_without_rating, 0);
    }

    #[test]
    fn text_and_json_agree() {
        let summary = build_summary(&datasets());
        let text = render_text(&summary);
        assert!(text.contains("Seasons: 2015-2020"));
        assert!(text.contains("(+20.0%)"));
        assert!(text.contains("League 3P%, 2020: 35.9% over 2,460 team games"));

        let json: serde_json::Value = serde_json::from_str(&render_json(&summary).unwrap()).unwrap();
        assert_eq!(json["mappedTeams"], 1);
        assert_eq!(json["hero"]["firstSeason"], 2015);
        assert_eq!(json["latestLeague"]["teamGames"], 2460);
    }
}
