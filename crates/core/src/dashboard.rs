use serde::Serialize;

use crate::charts::ChartControl;
use crate::format;
use crate::model::SeasonMetric;
use crate::story::{ChartAction, ChartCommand, StoryTarget};
use crate::tooltip::Callout;

/// Element id of the headline growth figure.
pub const GROWTH_ANCHOR: &str = "avgGrowth";

/// Owns the control surface of every chart that mounted.
///
/// Built once at boot and handed to whatever dispatches story commands. A
/// chart whose anchor was missing simply has no slot.
#[derive(Default)]
pub struct Dashboard {
    trend: Option<Box<dyn ChartControl>>,
    mix: Option<Box<dyn ChartControl>>,
    scatter: Option<Box<dyn ChartControl>>,
    heatmap: Option<Box<dyn ChartControl>>,
    map: Option<Box<dyn ChartControl>>,
    spiral: Option<Box<dyn ChartControl>>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: StoryTarget, control: Box<dyn ChartControl>) {
        *self.slot_mut(target) = Some(control);
    }

    pub fn has(&self, target: StoryTarget) -> bool {
        self.slot(target).is_some()
    }

    pub fn mounted(&self) -> Vec<StoryTarget> {
        StoryTarget::ALL
            .into_iter()
            .filter(|target| self.has(*target))
            .collect()
    }

    const fn slot(&self, target: StoryTarget) -> &Option<Box<dyn ChartControl>> {
        match target {
            StoryTarget::Trend => &self.trend,
            StoryTarget::Mix => &self.mix,
            StoryTarget::Scatter => &self.scatter,
            StoryTarget::Heatmap => &self.heatmap,
            StoryTarget::Map => &self.map,
            StoryTarget::Spiral => &self.spiral,
        }
    }

    fn slot_mut(&mut self, target: StoryTarget) -> &mut Option<Box<dyn ChartControl>> {
        match target {
            StoryTarget::Trend => &mut self.trend,
            StoryTarget::Mix => &mut self.mix,
            StoryTarget::Scatter => &mut self.scatter,
            StoryTarget::Heatmap => &mut self.heatmap,
            StoryTarget::Map => &mut self.map,
            StoryTarget::Spiral => &mut self.spiral,
        }
    }

    /// Sends one command to its chart. Charts that are not mounted, or that
    /// do not support the action, ignore it.
    pub fn apply(&mut self, command: &ChartCommand) -> Option<Callout> {
        let Some(control) = self.slot_mut(command.target).as_deref_mut() else {
            log::debug!("no {} chart mounted; skipping {:?}", command.target.as_str(), command.action);
            return None;
        };
        match &command.action {
            ChartAction::SetMetric(key) => control.set_metric(key),
            ChartAction::FocusSeason(season) => control.focus_season(*season),
            ChartAction::SetSeason(season) => control.set_season(*season),
            ChartAction::Highlight(request) => control.highlight(request),
            ChartAction::FocusConference(conference) => control.focus_conference(conference),
        }
    }

    /// Applies commands in order; the last callout produced wins.
    pub fn apply_all(&mut self, commands: &[ChartCommand]) -> Option<Callout> {
        commands
            .iter()
            .fold(None, |last, command| self.apply(command).or(last))
    }
}

/// Headline numbers above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroMetrics {
    pub first_season: i32,
    pub last_season: i32,
    pub first_rate: f64,
    pub last_rate: f64,
    /// Percent change of the three-point attempt rate, first to last season.
    pub growth: f64,
}

impl HeroMetrics {
    pub fn growth_label(&self) -> String {
        format::signed_percent(self.growth, 1)
    }
}

/// Compares the chronologically first and last seasons regardless of input
/// order. `None` without data or when the first rate is zero.
pub fn hero_metrics(records: &[SeasonMetric]) -> Option<HeroMetrics> {
    let mut sorted: Vec<&SeasonMetric> = records.iter().collect();
    sorted.sort_by_key(|record| record.season);
    let (first, last) = (sorted.first()?, sorted.last()?);
    if first.avg_three_rate == 0.0 {
        log::warn!("season {} has a zero three-point rate; growth undefined", first.season);
        return None;
    }
    Some(HeroMetrics {
        first_season: first.season,
        last_season: last.season,
        first_rate: first.avg_three_rate,
        last_rate: last.avg_three_rate,
        growth: (last.avg_three_rate - first.avg_three_rate) / first.avg_three_rate * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::charts::HighlightRequest;
    use crate::tooltip::TooltipContent;

    fn season(season: i32, rate: f64) -> SeasonMetric {
        SeasonMetric {
            season,
            avg_three_attempts: 0.0,
            avg_points: 0.0,
            avg_three_rate: rate,
            avg_three_pct: None,
            team_games: None,
        }
    }

    #[derive(Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl ChartControl for Recorder {
        fn set_metric(&mut self, key: &str) -> Option<Callout> {
            self.0.borrow_mut().push(format!("metric {key}"));
            None
        }

        fn highlight(&mut self, request: &HighlightRequest) -> Option<Callout> {
            self.0.borrow_mut().push(format!("highlight {:?}", request.team));
            Some(Callout {
                content: TooltipContent::new("hit"),
                x: 1.0,
                y: 2.0,
            })
        }
    }

    #[test]
    fn growth_uses_chronological_endpoints() {
        let metrics = hero_metrics(&[season(2020, 0.36), season(2015, 0.30)]).unwrap();
        assert_eq!((metrics.first_season, metrics.last_season), (2015, 2020));
        assert!((metrics.growth - 20.0).abs() < 1e-9);
        assert_eq!(metrics.growth_label(), "+20.0%");
    }

    #[test]
    fn growth_needs_data() {
        assert_eq!(hero_metrics(&[]), None);
        assert_eq!(hero_metrics(&[season(2015, 0.0), season(2016, 0.1)]), None);
    }

    #[test]
    fn commands_reach_the_named_chart_only() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dashboard = Dashboard::new();
        dashboard.insert(StoryTarget::Map, Box::new(Recorder(Rc::clone(&log))));

        let commands = [
            ChartCommand {
                target: StoryTarget::Map,
                action: ChartAction::SetMetric("offRtg".to_string()),
            },
            ChartCommand {
                target: StoryTarget::Map,
                action: ChartAction::Highlight(HighlightRequest {
                    team: Some("Jazz".to_string()),
                    season: None,
                }),
            },
            ChartCommand {
                target: StoryTarget::Trend,
                action: ChartAction::FocusSeason(2019),
            },
        ];
        let callout = dashboard.apply_all(&commands);

        assert_eq!(callout.map(|c| c.content.title), Some("hit".to_string()));
        assert_eq!(*log.borrow(), vec!["metric offRtg", "highlight Some(\"Jazz\")"]);
        assert_eq!(dashboard.mounted(), vec![StoryTarget::Map]);
    }

    #[test]
    fn unsupported_actions_are_noops() {
        let mut dashboard = Dashboard::new();
        dashboard.insert(StoryTarget::Spiral, Box::new(Recorder::default()));
        let command = ChartCommand {
            target: StoryTarget::Spiral,
            action: ChartAction::FocusConference("West".to_string()),
        };
        assert_eq!(dashboard.apply(&command), None);
    }
}
