use std::cell::RefCell;
use std::rc::Rc;

use beyond_the_arc_core::charts::{Chart, ChartControl, HighlightRequest};
use beyond_the_arc_core::error::Result;
use beyond_the_arc_core::tooltip::Callout;
use web_sys::{Document, Element, MouseEvent};

use crate::dom::{listen, set_text};
use crate::mount::{Animator, SceneMount};
use crate::tooltip::SharedTooltip;

/// A chart mounted in its container, with pointer handlers attached.
pub struct ChartView<C> {
    chart: C,
    mount: SceneMount,
    document: Document,
    tooltip: SharedTooltip,
    scene_size: (f64, f64),
}

pub type SharedChart<C> = Rc<RefCell<ChartView<C>>>;

impl<C: Chart + 'static> ChartView<C> {
    pub fn mount(
        document: &Document,
        container: &Element,
        chart: C,
        animator: Animator,
        tooltip: SharedTooltip,
    ) -> Result<SharedChart<C>> {
        let mount = SceneMount::new(document, container, animator)?;
        let svg = mount.svg().clone();
        let view = Rc::new(RefCell::new(Self {
            chart,
            mount,
            document: document.clone(),
            tooltip,
            scene_size: (0.0, 0.0),
        }));
        view.borrow_mut().render();

        let hover = Rc::clone(&view);
        listen(&svg, "mousemove", move |event: MouseEvent| {
            let view = hover.borrow();
            let pointer = (f64::from(event.client_x()), f64::from(event.client_y()));
            let (x, y) = view.to_chart(pointer);
            let mut tooltip = view.tooltip.borrow_mut();
            match view.chart.hover(x, y) {
                Some(callout) => tooltip.show(callout.content, pointer),
                None => tooltip.hide(),
            }
        });
        let leave = Rc::clone(&view);
        listen(&svg, "mouseleave", move |_: MouseEvent| {
            leave.borrow().tooltip.borrow_mut().hide();
        });

        Ok(view)
    }

    pub const fn chart(&self) -> &C {
        &self.chart
    }

    pub fn render(&mut self) {
        let scene = self.chart.scene();
        self.scene_size = (scene.width, scene.height);
        if let Err(error) = self.mount.render(&scene) {
            log::error!("render failed: {error}");
        }
        for (id, text) in self.chart.annotations() {
            set_text(&self.document, id, &text);
        }
    }

    /// Mutates the chart, re-renders and shows any resulting callout.
    pub fn update(&mut self, change: impl FnOnce(&mut C) -> Option<Callout>) -> Option<Callout> {
        let callout = change(&mut self.chart);
        self.render();
        if let Some(callout) = &callout {
            let pointer = self.to_viewport((callout.x, callout.y));
            self.tooltip
                .borrow_mut()
                .show(callout.content.clone(), pointer);
        }
        callout
    }

    fn scale(&self) -> (f64, f64, f64, f64) {
        let rect = self.mount.svg().get_bounding_client_rect();
        let (width, height) = self.scene_size;
        let sx = if rect.width() > 0.0 { width / rect.width() } else { 1.0 };
        let sy = if rect.height() > 0.0 { height / rect.height() } else { 1.0 };
        (rect.left(), rect.top(), sx, sy)
    }

    fn to_chart(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let (left, top, sx, sy) = self.scale();
        ((x - left) * sx, (y - top) * sy)
    }

    fn to_viewport(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let (left, top, sx, sy) = self.scale();
        (x / sx + left, y / sy + top)
    }
}

/// Dashboard handle for a mounted chart; every control call re-renders.
pub struct MountedChart<C>(pub SharedChart<C>);

impl<C: Chart + 'static> ChartControl for MountedChart<C> {
    fn set_metric(&mut self, key: &str) -> Option<Callout> {
        self.0.borrow_mut().update(|chart| chart.set_metric(key))
    }

    fn focus_season(&mut self, season: i32) -> Option<Callout> {
        self.0.borrow_mut().update(|chart| chart.focus_season(season))
    }

    fn set_season(&mut self, season: i32) -> Option<Callout> {
        self.0.borrow_mut().update(|chart| chart.set_season(season))
    }

    fn highlight(&mut self, request: &HighlightRequest) -> Option<Callout> {
        self.0.borrow_mut().update(|chart| chart.highlight(request))
    }

    fn focus_conference(&mut self, conference: &str) -> Option<Callout> {
        self.0
            .borrow_mut()
            .update(|chart| chart.focus_conference(conference))
    }
}
