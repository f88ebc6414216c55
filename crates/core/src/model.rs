//! Records consumed as-is from the precomputed JSON datasets.
//!
//! Optional fields are `Option`s; the default applied when one is missing is
//! documented on the accessor that applies it.

use serde::{Deserialize, Serialize};

use crate::format;

/// Win percentage assumed for teams without standings.
pub const DEFAULT_WIN_PCT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonMetric {
    pub season: i32,
    pub avg_three_attempts: f64,
    pub avg_points: f64,
    pub avg_three_rate: f64,
    #[serde(default)]
    pub avg_three_pct: Option<f64>,
    #[serde(default)]
    pub team_games: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringMixRecord {
    pub season: i32,
    pub two_pct: f64,
    pub three_pct: f64,
    pub ft_pct: f64,
}

impl ScoringMixRecord {
    pub fn total(&self) -> f64 {
        self.two_pct + self.three_pct + self.ft_pct
    }

    pub const fn share(&self, share: MixShare) -> f64 {
        match share {
            MixShare::Two => self.two_pct,
            MixShare::Three => self.three_pct,
            MixShare::FreeThrow => self.ft_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSeasonStat {
    pub season: i32,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub abbr: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    pub avg_three_attempts: f64,
    pub three_pct: f64,
    #[serde(default)]
    pub three_rate: Option<f64>,
    #[serde(default)]
    pub win_pct: Option<f64>,
    #[serde(default)]
    pub wins: Option<f64>,
    #[serde(default)]
    pub losses: Option<f64>,
    #[serde(default)]
    pub games_played: Option<u32>,
}

impl TeamSeasonStat {
    /// Join key across seasons: team id, then abbreviation, then city + name.
    pub fn key(&self) -> String {
        if let Some(id) = self.team_id.as_deref().filter(|id| !id.is_empty()) {
            return id.to_string();
        }
        if let Some(abbr) = self.abbr.as_deref().filter(|abbr| !abbr.is_empty()) {
            return abbr.to_string();
        }
        format!("{} {}", self.city(), self.team()).trim().to_string()
    }

    pub fn team(&self) -> &str {
        self.team.as_deref().unwrap_or_default()
    }

    pub fn city(&self) -> &str {
        self.city.as_deref().unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        display_name(self.city(), self.team())
    }

    pub fn conference(&self) -> Option<Conference> {
        self.conference.as_deref().and_then(Conference::parse)
    }

    /// Wins and losses as `"53-29"`, when both are known.
    pub fn standing(&self) -> Option<String> {
        let (wins, losses) = (self.wins?, self.losses?);
        Some(format!("{}-{}", format::number(wins, 0), format::number(losses, 0)))
    }

    /// Missing standings fall back to [`DEFAULT_WIN_PCT`].
    pub fn win_pct_or_default(&self) -> f64 {
        self.win_pct.unwrap_or(DEFAULT_WIN_PCT)
    }

    /// Case-insensitive match on id, abbreviation, nickname, city or full name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }
        [
            self.team_id.as_deref(),
            self.abbr.as_deref(),
            self.team.as_deref(),
            self.city.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.eq_ignore_ascii_case(query))
            || self.display_name().eq_ignore_ascii_case(query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub season: i32,
    pub abbr: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    pub three_rate: f64,
    pub three_pct: f64,
}

impl HeatmapCell {
    pub fn display_name(&self) -> String {
        display_name(
            self.city.as_deref().unwrap_or_default(),
            self.team.as_deref().unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamGeoStat {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Excluded from the radius extent when missing.
    #[serde(default)]
    pub off_rtg: Option<f64>,
    pub three_rate: f64,
    pub three_pct: f64,
}

impl TeamGeoStat {
    pub fn team(&self) -> &str {
        self.team.as_deref().unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        display_name(self.city.as_deref().unwrap_or_default(), self.team())
    }

    pub fn conference(&self) -> Option<Conference> {
        self.conference.as_deref().and_then(Conference::parse)
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        !query.is_empty()
            && (self.team().eq_ignore_ascii_case(query)
                || self
                    .city
                    .as_deref()
                    .is_some_and(|city| city.eq_ignore_ascii_case(query))
                || self.display_name().eq_ignore_ascii_case(query))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumPoint {
    pub season: i32,
    pub momentum: f64,
    pub avg_three_rate: f64,
    pub avg_three_pct: f64,
}

fn display_name(city: &str, team: &str) -> String {
    format!("{city} {team}").trim().to_string()
}

/// League-trend metrics selectable through `setMetric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AvgThreeAttempts,
    AvgPoints,
    AvgThreeRate,
}

impl Metric {
    pub const ALL: [Self; 3] = [Self::AvgThreeAttempts, Self::AvgPoints, Self::AvgThreeRate];

    pub const fn key(self) -> &'static str {
        match self {
            Self::AvgThreeAttempts => "avgThreeAttempts",
            Self::AvgPoints => "avgPoints",
            Self::AvgThreeRate => "avgThreeRate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|metric| metric.key().eq_ignore_ascii_case(value))
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AvgThreeAttempts => "3PA per game",
            Self::AvgPoints => "Points per game",
            Self::AvgThreeRate => "3PA rate",
        }
    }

    pub const fn value(self, record: &SeasonMetric) -> f64 {
        match self {
            Self::AvgThreeAttempts => record.avg_three_attempts,
            Self::AvgPoints => record.avg_points,
            Self::AvgThreeRate => record.avg_three_rate,
        }
    }

    pub const fn is_share(self) -> bool {
        matches!(self, Self::AvgThreeRate)
    }
}

/// Bands of the scoring-mix stack, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixShare {
    Two,
    Three,
    FreeThrow,
}

impl MixShare {
    pub const ALL: [Self; 3] = [Self::Two, Self::Three, Self::FreeThrow];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Two => "twoPct",
            Self::Three => "threePct",
            Self::FreeThrow => "ftPct",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|share| share.key().eq_ignore_ascii_case(value))
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Two => "Two-pointers",
            Self::Three => "Three-pointers",
            Self::FreeThrow => "Free throws",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conference {
    East,
    West,
}

impl Conference {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "east" | "eastern" => Some(Self::East),
            "west" | "western" => Some(Self::West),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::East => "East",
            Self::West => "West",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_record_without_optional_fields_deserializes() {
        let json = r#"{"season": 2019, "teamId": "1610612744", "avgThreeAttempts": 31.2, "threePct": 0.38}"#;
        let record: TeamSeasonStat = serde_json::from_str(json).unwrap();

        assert_eq!(record.win_pct, None);
        assert!((record.win_pct_or_default() - 0.5).abs() < f64::EPSILON);
        assert_eq!(record.team(), "");
        assert_eq!(record.key(), "1610612744");
    }

    #[test]
    fn team_key_falls_back_to_abbreviation_then_name() {
        let mut record = TeamSeasonStat {
            season: 2020,
            team_id: Some(String::new()),
            city: Some("Golden State".to_string()),
            team: Some("Warriors".to_string()),
            abbr: Some("GSW".to_string()),
            conference: None,
            avg_three_attempts: 0.0,
            three_pct: 0.0,
            three_rate: None,
            win_pct: None,
            wins: None,
            losses: None,
            games_played: None,
        };
        assert_eq!(record.key(), "GSW");
        record.abbr = None;
        assert_eq!(record.key(), "Golden State Warriors");
        assert!(record.matches("golden state warriors"));
        assert!(record.matches("warriors"));
        assert!(!record.matches(" "));
    }

    #[test]
    fn standing_needs_wins_and_losses() {
        let json = r#"{"season": 2020, "teamId": "1", "avgThreeAttempts": 45.3, "threePct": 0.348,
                       "wins": 44.0, "losses": 28.0, "gamesPlayed": 72}"#;
        let mut record: TeamSeasonStat = serde_json::from_str(json).unwrap();
        assert_eq!(record.standing().as_deref(), Some("44-28"));
        assert_eq!(record.games_played, Some(72));

        record.losses = None;
        assert_eq!(record.standing(), None);
    }

    #[test]
    fn metric_and_conference_parse_leniently() {
        assert_eq!(Metric::parse("avgpoints"), Some(Metric::AvgPoints));
        assert_eq!(Metric::parse("rebounds"), None);
        assert_eq!(MixShare::parse("threePct"), Some(MixShare::Three));
        assert_eq!(Conference::parse("Eastern"), Some(Conference::East));
        assert_eq!(Conference::parse(" west "), Some(Conference::West));
    }
}
