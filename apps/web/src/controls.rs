use std::rc::Rc;

use beyond_the_arc_core::charts::{ChartControl, TeamScatterChart, TrendChart};
use beyond_the_arc_core::story::ACTIVE_CLASS;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, MouseEvent};

use crate::dom::{anchor, append, create, listen, set_attr};
use crate::view::SharedChart;

pub const LEGEND_ANCHOR: &str = "trendLegend";
pub const SLIDER_ANCHOR: &str = "seasonSlider";

/// One button per trend metric; clicking toggles the metric filter.
pub fn mount_legend(document: &Document, view: &SharedChart<TrendChart>) {
    let Some(container) = anchor(document, LEGEND_ANCHOR) else {
        return;
    };
    container.set_text_content(None);

    let items = view.borrow().chart().legend_items();
    let mut buttons: Vec<Element> = Vec::with_capacity(items.len());
    for item in &items {
        let Ok(button) = create(document, "button") else {
            continue;
        };
        set_attr(&button, "type", "button");
        set_attr(&button, "class", "legend-item");
        set_attr(&button, "data-metric", item.metric.key());
        if let Ok(swatch) = create(document, "span") {
            set_attr(&swatch, "class", "legend-swatch");
            if let Some(swatch) = swatch.dyn_ref::<HtmlElement>() {
                let _ = swatch.style().set_property("background", item.color);
            }
            append(&button, &swatch);
        }
        if let Ok(label) = create(document, "span") {
            label.set_text_content(Some(item.label));
            append(&button, &label);
        }
        append(&container, &button);
        buttons.push(button);
    }
    let buttons = Rc::new(buttons);
    refresh_legend(&buttons, view);

    for (item, button) in items.into_iter().zip(buttons.iter()) {
        let view = Rc::clone(view);
        let buttons = Rc::clone(&buttons);
        listen(button, "click", move |_: MouseEvent| {
            view.borrow_mut()
                .update(|chart| chart.toggle_metric(item.metric));
            refresh_legend(&buttons, &view);
        });
    }
}

fn refresh_legend(buttons: &[Element], view: &SharedChart<TrendChart>) {
    let items = view.borrow().chart().legend_items();
    for (item, button) in items.iter().zip(buttons) {
        let _ = button
            .class_list()
            .toggle_with_force(ACTIVE_CLASS, item.active);
        set_attr(button, "aria-pressed", if item.active { "true" } else { "false" });
    }
}

/// Range input stepping the scatter chart through its seasons.
pub struct SeasonSlider {
    input: HtmlInputElement,
    view: SharedChart<TeamScatterChart>,
}

impl SeasonSlider {
    pub fn mount(document: &Document, view: &SharedChart<TeamScatterChart>) -> Option<Rc<Self>> {
        let input = anchor(document, SLIDER_ANCHOR)?
            .dyn_into::<HtmlInputElement>()
            .ok()?;
        let seasons = view.borrow().chart().seasons();
        let (Some(first), Some(last)) = (seasons.first(), seasons.last()) else {
            return None;
        };
        input.set_min(&first.to_string());
        input.set_max(&last.to_string());
        input.set_step("1");

        let slider = Rc::new(Self {
            input: input.clone(),
            view: Rc::clone(view),
        });
        slider.sync();

        let handler = Rc::clone(&slider);
        listen(&input, "input", move |_: Event| handler.on_input());
        Some(slider)
    }

    fn on_input(&self) {
        let value = self.input.value_as_number();
        if !value.is_finite() {
            return;
        }
        let season = value.round() as i32;
        self.view
            .borrow_mut()
            .update(|chart| chart.set_season(season));
        self.sync();
    }

    /// Moves the thumb to the season the chart is showing.
    pub fn sync(&self) {
        if let Some(season) = self.view.borrow().chart().season() {
            self.input.set_value(&season.to_string());
        }
    }
}
