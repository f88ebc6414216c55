use std::cell::RefCell;
use std::rc::Rc;

use beyond_the_arc_core::error::Result;
use beyond_the_arc_core::tooltip::{Tooltip, TooltipContent};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::dom::{append, create, viewport};

const TOOLTIP_ID: &str = "tooltip";

/// The page's only tooltip element and the state behind it.
pub struct TooltipView {
    window: Window,
    document: Document,
    element: HtmlElement,
    model: Tooltip,
}

pub type SharedTooltip = Rc<RefCell<TooltipView>>;

impl TooltipView {
    /// Reuses `#tooltip` when the page provides one.
    pub fn attach(window: &Window, document: &Document) -> Result<SharedTooltip> {
        let element = match document.get_element_by_id(TOOLTIP_ID) {
            Some(element) => element,
            None => {
                let element = create(document, "div")?;
                element.set_id(TOOLTIP_ID);
                element.set_class_name("tooltip");
                if let Some(body) = document.body() {
                    append(&body, &element);
                }
                element
            }
        };
        let element = element.unchecked_into::<HtmlElement>();
        let style = element.style();
        let _ = style.set_property("position", "fixed");
        let _ = style.set_property("pointer-events", "none");
        let _ = style.set_property("opacity", "0");

        Ok(Rc::new(RefCell::new(Self {
            window: window.clone(),
            document: document.clone(),
            element,
            model: Tooltip::default(),
        })))
    }

    /// Shows `content` next to the viewport point `pointer`.
    pub fn show(&mut self, content: TooltipContent, pointer: (f64, f64)) {
        if self.model.content() != Some(&content) {
            self.fill(&content);
            self.model.show(content);
        }
        self.move_to(pointer);
        let _ = self.element.style().set_property("opacity", "1");
    }

    pub fn move_to(&mut self, pointer: (f64, f64)) {
        let rect = self.element.get_bounding_client_rect();
        self.model
            .move_to(pointer, (rect.width(), rect.height()), viewport(&self.window));
        let (x, y) = self.model.position();
        let style = self.element.style();
        let _ = style.set_property("left", &format!("{x}px"));
        let _ = style.set_property("top", &format!("{y}px"));
    }

    pub fn hide(&mut self) {
        if !self.model.is_visible() {
            return;
        }
        self.model.hide();
        let _ = self.element.style().set_property("opacity", "0");
    }

    fn fill(&self, content: &TooltipContent) {
        self.element.set_text_content(None);
        let Ok(title) = create(&self.document, "strong") else {
            return;
        };
        title.set_text_content(Some(&content.title));
        append(&self.element, &title);
        for (label, value) in &content.rows {
            let Ok(row) = create(&self.document, "div") else {
                continue;
            };
            row.set_text_content(Some(&format!("{label}: {value}")));
            append(&self.element, &row);
        }
    }
}
