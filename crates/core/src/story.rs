//! Scroll-driven narrative steps and the chart commands they produce.
//!
//! Steps are grouped by their parent container. Each group tracks one active
//! step; activating a different step yields the commands to send to the
//! chart named by its `data-story` attribute.

use crate::charts::HighlightRequest;

/// Observer margin that leaves a thin band across the middle of the viewport.
pub const ROOT_MARGIN: &str = "-45% 0px -45% 0px";
pub const ACTIVE_CLASS: &str = "is-active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoryTarget {
    Trend,
    Mix,
    Scatter,
    Heatmap,
    Map,
    Spiral,
}

impl StoryTarget {
    pub const ALL: [Self; 6] = [
        Self::Trend,
        Self::Mix,
        Self::Scatter,
        Self::Heatmap,
        Self::Map,
        Self::Spiral,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trend" | "trends" | "league" | "leaguetrend" | "leaguetrends" => Some(Self::Trend),
            "mix" | "scoring" | "scoringmix" => Some(Self::Mix),
            "scatter" | "teamscatter" => Some(Self::Scatter),
            "heatmap" | "heat" => Some(Self::Heatmap),
            "map" | "teammap" | "geo" => Some(Self::Map),
            "spiral" | "momentum" | "momentumspiral" => Some(Self::Spiral),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Mix => "mix",
            Self::Scatter => "scatter",
            Self::Heatmap => "heatmap",
            Self::Map => "map",
            Self::Spiral => "spiral",
        }
    }

    /// Element id of the chart container.
    pub const fn anchor(self) -> &'static str {
        match self {
            Self::Trend => "leagueTrendChart",
            Self::Mix => "scoringMixChart",
            Self::Scatter => "teamScatter",
            Self::Heatmap => "heatmapChart",
            Self::Map => "teamMap",
            Self::Spiral => "momentumSpiral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartAction {
    SetMetric(String),
    FocusSeason(i32),
    SetSeason(i32),
    Highlight(HighlightRequest),
    FocusConference(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartCommand {
    pub target: StoryTarget,
    pub action: ChartAction,
}

/// The `data-*` attributes of one `.story-step` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepSpec {
    pub story: Option<StoryTarget>,
    pub season: Option<i32>,
    pub metric: Option<String>,
    pub team: Option<String>,
    pub conference: Option<String>,
}

impl StepSpec {
    /// Reads the step from an attribute lookup such as `Element::get_attribute`.
    pub fn from_attributes(attribute: impl Fn(&str) -> Option<String>) -> Self {
        let text = |name: &str| {
            attribute(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let story = text("data-story");
        let parsed = story.as_deref().and_then(StoryTarget::parse);
        if let (Some(raw), None) = (&story, parsed) {
            log::warn!("story step targets unknown chart {raw:?}");
        }
        let season = text("data-season").and_then(|raw| match raw.parse() {
            Ok(season) => Some(season),
            Err(_) => {
                log::warn!("ignoring story season {raw:?}");
                None
            }
        });

        Self {
            story: parsed,
            season,
            metric: text("data-metric"),
            team: text("data-team"),
            conference: text("data-conference"),
        }
    }

    /// Commands in dispatch order: metric, season, highlight, conference.
    /// The scatter moves to a season; other charts focus it.
    pub fn commands(&self) -> Vec<ChartCommand> {
        let Some(target) = self.story else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if let Some(metric) = &self.metric {
            actions.push(ChartAction::SetMetric(metric.clone()));
        }
        if let Some(season) = self.season {
            actions.push(match target {
                StoryTarget::Scatter => ChartAction::SetSeason(season),
                _ => ChartAction::FocusSeason(season),
            });
        }
        if let Some(team) = &self.team {
            actions.push(ChartAction::Highlight(HighlightRequest {
                team: Some(team.clone()),
                season: self.season,
            }));
        }
        if let Some(conference) = &self.conference {
            actions.push(ChartAction::FocusConference(conference.clone()));
        }
        actions
            .into_iter()
            .map(|action| ChartCommand { target, action })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryGroup {
    steps: Vec<StepSpec>,
    active: usize,
}

impl StoryGroup {
    /// Starts at the step marked active in the markup, else the first.
    pub fn new(steps: Vec<StepSpec>, marked_active: Option<usize>) -> Self {
        let active = marked_active.filter(|index| *index < steps.len()).unwrap_or(0);
        Self { steps, active }
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    pub const fn active(&self) -> usize {
        self.active
    }
}

/// Active step per group. Holds no chart references; activation returns
/// commands for the caller to dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryController {
    groups: Vec<StoryGroup>,
}

impl StoryController {
    pub const fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Registers a group and returns its index.
    pub fn add_group(&mut self, group: StoryGroup) -> usize {
        self.groups.push(group);
        self.groups.len() - 1
    }

    pub fn groups(&self) -> &[StoryGroup] {
        &self.groups
    }

    pub fn active_step(&self, group: usize) -> Option<usize> {
        self.groups.get(group).map(StoryGroup::active)
    }

    pub fn is_active(&self, group: usize, step: usize) -> bool {
        self.active_step(group) == Some(step)
    }

    /// Commands that bring every chart to its group's starting step.
    pub fn initial_commands(&self) -> Vec<ChartCommand> {
        self.groups
            .iter()
            .filter_map(|group| group.steps.get(group.active))
            .flat_map(StepSpec::commands)
            .collect()
    }

    /// Makes `step` the active one in `group`. Returns `None` when it already
    /// was, or the indices are out of range.
    pub fn activate(&mut self, group: usize, step: usize) -> Option<Vec<ChartCommand>> {
        let story = self.groups.get_mut(group)?;
        if story.active == step {
            return None;
        }
        let spec = story.steps.get(step)?;
        story.active = step;
        log::debug!("story group {group} -> step {step}");
        Some(spec.commands())
    }

    /// Intersection-observer entry for one step.
    pub fn on_intersection(
        &mut self,
        group: usize,
        step: usize,
        is_intersecting: bool,
    ) -> Option<Vec<ChartCommand>> {
        if is_intersecting {
            self.activate(group, step)
        } else {
            None
        }
    }
}
