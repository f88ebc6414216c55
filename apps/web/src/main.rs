mod config;
mod controls;
mod dom;
mod fetch;
mod logger;
mod mount;
mod story;
mod tooltip;
mod view;

use std::cell::RefCell;
use std::rc::Rc;

use beyond_the_arc_core::charts::{
    Chart, HeatmapChart, MomentumSpiralChart, ScoringMixChart, TeamMapChart, TeamScatterChart,
    TrendChart,
};
use beyond_the_arc_core::dashboard::{hero_metrics, Dashboard, GROWTH_ANCHOR};
use beyond_the_arc_core::dataset::Datasets;
use beyond_the_arc_core::error::Result;
use beyond_the_arc_core::story::StoryTarget;
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;

use config::DashboardConfig;
use controls::SeasonSlider;
use mount::Animator;
use tooltip::{SharedTooltip, TooltipView};
use view::{ChartView, MountedChart, SharedChart};

fn main() {
    logger::init(log::LevelFilter::Info);
    spawn_local(async {
        if let Err(error) = boot().await {
            log::error!("dashboard not started: {error}");
        }
    });
}

async fn boot() -> Result<()> {
    let window = dom::window()?;
    let document = dom::document(&window)?;
    let config = DashboardConfig::from_document(&document);
    log::set_max_level(config.log_level());

    let datasets = fetch::fetch_datasets(&window, &config).await?;

    if let Some(metrics) = hero_metrics(&datasets.league_trends) {
        dom::set_text(&document, GROWTH_ANCHOR, &metrics.growth_label());
    }

    let mounter = Mounter {
        document: document.clone(),
        animator: Animator::new(window.clone(), config.transition_ms),
        tooltip: TooltipView::attach(&window, &document)?,
        fallback_width: config.fallback_width,
    };
    let (dashboard, slider) = mounter.mount_all(datasets);
    let mounted = dashboard.mounted().len();
    let dashboard = Rc::new(RefCell::new(dashboard));

    story::wire(&document, dashboard, move || {
        if let Some(slider) = &slider {
            slider.sync();
        }
    })?;
    mounter.tooltip.borrow_mut().hide();

    log::info!("dashboard ready: {mounted} of {} charts", StoryTarget::ALL.len());
    Ok(())
}

struct Mounter {
    document: Document,
    animator: Animator,
    tooltip: SharedTooltip,
    fallback_width: f64,
}

impl Mounter {
    /// Builds every chart whose anchor exists. A missing anchor or a failed
    /// mount skips that chart only.
    fn mount_all(&self, datasets: Datasets) -> (Dashboard, Option<Rc<SeasonSlider>>) {
        let Datasets {
            league_trends,
            scoring_mix,
            team_scatter,
            heatmap,
            team_map,
            momentum,
            topology,
        } = datasets;
        let mut dashboard = Dashboard::new();

        if let Some(view) = self.mount(StoryTarget::Trend, |width| {
            TrendChart::new(league_trends, width)
        }) {
            controls::mount_legend(&self.document, &view);
            dashboard.insert(StoryTarget::Trend, Box::new(MountedChart(view)));
        }
        if let Some(view) = self.mount(StoryTarget::Mix, |width| {
            ScoringMixChart::new(scoring_mix, width)
        }) {
            dashboard.insert(StoryTarget::Mix, Box::new(MountedChart(view)));
        }
        let mut slider = None;
        if let Some(view) = self.mount(StoryTarget::Scatter, |width| {
            TeamScatterChart::new(team_scatter, width)
        }) {
            slider = SeasonSlider::mount(&self.document, &view);
            dashboard.insert(StoryTarget::Scatter, Box::new(MountedChart(view)));
        }
        if let Some(view) = self.mount(StoryTarget::Heatmap, |width| {
            HeatmapChart::new(heatmap, width)
        }) {
            dashboard.insert(StoryTarget::Heatmap, Box::new(MountedChart(view)));
        }
        if let Some(view) = self.mount(StoryTarget::Map, |width| {
            TeamMapChart::new(team_map, Some(&topology), width)
        }) {
            dashboard.insert(StoryTarget::Map, Box::new(MountedChart(view)));
        }
        if let Some(view) = self.mount(StoryTarget::Spiral, |width| {
            MomentumSpiralChart::new(momentum, width)
        }) {
            dashboard.insert(StoryTarget::Spiral, Box::new(MountedChart(view)));
        }

        (dashboard, slider)
    }

    fn mount<C: Chart + 'static>(
        &self,
        target: StoryTarget,
        build: impl FnOnce(f64) -> C,
    ) -> Option<SharedChart<C>> {
        let container = dom::anchor(&self.document, target.anchor())?;
        let chart = build(dom::measured_width(&container, self.fallback_width));
        match ChartView::mount(
            &self.document,
            &container,
            chart,
            self.animator.clone(),
            Rc::clone(&self.tooltip),
        ) {
            Ok(view) => Some(view),
            Err(error) => {
                log::warn!("{} chart skipped: {error}", target.as_str());
                None
            }
        }
    }
}
