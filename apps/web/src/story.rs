use std::cell::RefCell;
use std::rc::Rc;

use beyond_the_arc_core::dashboard::Dashboard;
use beyond_the_arc_core::error::{DashboardError, Result};
use beyond_the_arc_core::story::{
    ChartCommand, StepSpec, StoryController, StoryGroup, ACTIVE_CLASS, ROOT_MARGIN,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    MouseEvent,
};

use crate::config::describe;
use crate::dom::listen;

const STEP_SELECTOR: &str = ".story-step";

struct StepBinding {
    element: Element,
    group: usize,
    step: usize,
}

/// Connects `.story-step` elements to the dashboard.
struct StoryWiring {
    controller: RefCell<StoryController>,
    steps: Vec<StepBinding>,
    dashboard: Rc<RefCell<Dashboard>>,
    after_dispatch: Box<dyn Fn()>,
}

impl StoryWiring {
    fn activate(&self, group: usize, step: usize, is_intersecting: bool) {
        let commands = self
            .controller
            .borrow_mut()
            .on_intersection(group, step, is_intersecting);
        if let Some(commands) = commands {
            self.refresh(group);
            self.dispatch(&commands);
        }
    }

    fn dispatch(&self, commands: &[ChartCommand]) {
        if commands.is_empty() {
            return;
        }
        self.dashboard.borrow_mut().apply_all(commands);
        (self.after_dispatch)();
    }

    fn refresh(&self, group: usize) {
        let controller = self.controller.borrow();
        for binding in self.steps.iter().filter(|binding| binding.group == group) {
            let _ = binding
                .element
                .class_list()
                .toggle_with_force(ACTIVE_CLASS, controller.is_active(group, binding.step));
        }
    }

    fn binding_for(&self, target: &Element) -> Option<&StepBinding> {
        self.steps
            .iter()
            .find(|binding| binding.element.is_same_node(Some(target)))
    }
}

/// Groups steps by parent, applies each group's starting step and starts
/// observing. `after_dispatch` runs after every batch of chart commands.
pub fn wire(
    document: &Document,
    dashboard: Rc<RefCell<Dashboard>>,
    after_dispatch: impl Fn() + 'static,
) -> Result<usize> {
    let nodes = document
        .query_selector_all(STEP_SELECTOR)
        .map_err(|error| DashboardError::Environment(describe(&error)))?;

    let mut parents: Vec<(Option<web_sys::Node>, Vec<Element>)> = Vec::new();
    for index in 0..nodes.length() {
        let Some(element) = nodes
            .item(index)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let parent = element.parent_node();
        let known = parents.iter_mut().find(|(existing, _)| {
            existing
                .as_ref()
                .is_some_and(|node| node.is_same_node(parent.as_ref()))
        });
        match known {
            Some((_, steps)) => steps.push(element),
            None => parents.push((parent, vec![element])),
        }
    }
    if parents.is_empty() {
        log::info!("no story steps on this page");
        return Ok(0);
    }

    let mut controller = StoryController::new();
    let mut steps = Vec::new();
    for (_, elements) in parents {
        let specs = elements
            .iter()
            .map(|element| StepSpec::from_attributes(|name| element.get_attribute(name)))
            .collect();
        let marked = elements
            .iter()
            .position(|element| element.class_list().contains(ACTIVE_CLASS));
        let group = controller.add_group(StoryGroup::new(specs, marked));
        steps.extend(
            elements
                .into_iter()
                .enumerate()
                .map(|(step, element)| StepBinding {
                    element,
                    group,
                    step,
                }),
        );
    }

    let initial = controller.initial_commands();
    let group_count = controller.groups().len();
    let wiring = Rc::new(StoryWiring {
        controller: RefCell::new(controller),
        steps,
        dashboard,
        after_dispatch: Box::new(after_dispatch),
    });
    for group in 0..group_count {
        wiring.refresh(group);
    }
    wiring.dispatch(&initial);

    observe(&wiring)?;
    for binding in &wiring.steps {
        let handler = Rc::clone(&wiring);
        let (group, step) = (binding.group, binding.step);
        listen(&binding.element, "click", move |_: MouseEvent| {
            handler.activate(group, step, true);
        });
    }

    log::debug!("story wired: {group_count} groups");
    Ok(group_count)
}

fn observe(wiring: &Rc<StoryWiring>) -> Result<()> {
    let handler = Rc::clone(wiring);
    let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let target = entry.target();
            if let Some(binding) = handler.binding_for(&target) {
                handler.activate(binding.group, binding.step, entry.is_intersecting());
            }
        }
    });

    let init = IntersectionObserverInit::new();
    init.set_root_margin(ROOT_MARGIN);
    init.set_threshold(&JsValue::from_f64(0.0));
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
        .map_err(|error| DashboardError::Environment(describe(&error)))?;
    for binding in &wiring.steps {
        observer.observe(&binding.element);
    }
    callback.forget();
    Ok(())
}
