use beyond_the_arc_core::error::{DashboardError, Result};
use beyond_the_arc_core::scene::Node;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

use crate::config::describe;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| DashboardError::Environment("no window".to_string()))
}

pub fn document(window: &Window) -> Result<Document> {
    window
        .document()
        .ok_or_else(|| DashboardError::Environment("no document".to_string()))
}

/// Looks up a chart or annotation anchor, warning when it is missing.
pub fn anchor(document: &Document, id: &str) -> Option<Element> {
    let element = document.get_element_by_id(id);
    if element.is_none() {
        log::warn!("{}", DashboardError::MissingAnchor(id.to_string()));
    }
    element
}

pub fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(element) = document.get_element_by_id(id) {
        element.set_text_content(Some(text));
    }
}

/// Rendered width, or `fallback` for hidden containers.
pub fn measured_width(element: &Element, fallback: f64) -> f64 {
    let width = element.get_bounding_client_rect().width();
    if width > 0.0 {
        width
    } else {
        fallback
    }
}

pub fn viewport(window: &Window) -> beyond_the_arc_core::tooltip::Viewport {
    let read = |value: std::result::Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0)
    };
    beyond_the_arc_core::tooltip::Viewport {
        width: read(window.inner_width()),
        height: read(window.inner_height()),
    }
}

pub fn create(document: &Document, tag: &str) -> Result<Element> {
    document
        .create_element(tag)
        .map_err(|error| DashboardError::Environment(describe(&error)))
}

pub fn create_svg(document: &Document, tag: &str) -> Result<Element> {
    document
        .create_element_ns(Some(SVG_NS), tag)
        .map_err(|error| DashboardError::Environment(describe(&error)))
}

pub fn set_attr(element: &Element, name: &str, value: &str) {
    if let Err(error) = element.set_attribute(name, value) {
        log::debug!("failed to set {name}: {}", describe(&error));
    }
}

/// Builds the SVG element tree for one scene node.
pub fn build_node(document: &Document, node: &Node) -> Result<Element> {
    let element = create_svg(document, node.tag)?;
    if let Some(key) = &node.key {
        set_attr(&element, "data-key", key);
    }
    for (name, value) in &node.attrs {
        set_attr(&element, name, value);
    }
    if let Some(text) = &node.text {
        element.set_text_content(Some(text));
    }
    for child in &node.children {
        let child = build_node(document, child)?;
        append(&element, &child);
    }
    Ok(element)
}

pub fn append(parent: &Element, child: &Element) {
    if let Err(error) = parent.append_child(child) {
        log::debug!("append failed: {}", describe(&error));
    }
}

/// Attaches `handler` for the page lifetime.
pub fn listen<E>(target: &Element, event: &str, handler: impl FnMut(E) + 'static)
where
    E: FromWasmAbi + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    if let Err(error) =
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::warn!("could not listen for {event}: {}", describe(&error));
    }
    closure.forget();
}
