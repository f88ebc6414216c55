//! Patches a chart [`Scene`] into the DOM.
//!
//! Plain layers are rebuilt on every render. Keyed layers are reconciled
//! through [`BoundLayer`]: entering nodes start from their enter attributes,
//! updated nodes tween from what was bound, exiting nodes tween to their exit
//! attributes and are then removed.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use beyond_the_arc_core::error::Result;
use beyond_the_arc_core::join::BoundLayer;
use beyond_the_arc_core::scene::{Attr, Layer, Node, Scene};
use beyond_the_arc_core::transition::{tween_attrs, Transition, TransitionState};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

use crate::dom::{append, build_node, create_svg, set_attr};

struct Tween {
    element: Element,
    from: Vec<Attr>,
    to: Node,
    remove: bool,
    transition: Transition,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Runs attribute tweens on `requestAnimationFrame` until none are left.
#[derive(Clone)]
pub struct Animator {
    window: Window,
    tweens: Rc<RefCell<Vec<Tween>>>,
    scheduled: Rc<Cell<bool>>,
    frame: FrameCallback,
    duration_ms: f64,
}

impl Animator {
    pub fn new(window: Window, duration_ms: f64) -> Self {
        let animator = Self {
            window,
            tweens: Rc::new(RefCell::new(Vec::new())),
            scheduled: Rc::new(Cell::new(false)),
            frame: Rc::new(RefCell::new(None)),
            duration_ms,
        };
        let tick = animator.clone();
        *animator.frame.borrow_mut() = Some(Closure::new(move |now: f64| tick.step(now)));
        animator
    }

    fn push(&self, element: Element, from: Vec<Attr>, to: Node, remove: bool) {
        if self.duration_ms <= 0.0 {
            finish(&element, &to, remove);
            return;
        }
        let mut tweens = self.tweens.borrow_mut();
        tweens.retain(|tween| !tween.element.is_same_node(Some(&element)));
        tweens.push(Tween {
            element,
            from,
            to,
            remove,
            transition: Transition::new(self.duration_ms),
        });
        drop(tweens);
        self.schedule();
    }

    fn schedule(&self) {
        if self.scheduled.get() {
            return;
        }
        let frame = self.frame.borrow();
        let Some(callback) = frame.as_ref() else {
            return;
        };
        if self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .is_ok()
        {
            self.scheduled.set(true);
        }
    }

    fn step(&self, now: f64) {
        self.scheduled.set(false);
        self.tweens.borrow_mut().retain_mut(|tween| {
            let t = tween.transition.advance(now);
            for (name, value) in tween_attrs(&tween.from, &tween.to, t) {
                set_attr(&tween.element, name, &value);
            }
            let done = tween.transition.state() == TransitionState::Finished;
            if done {
                finish(&tween.element, &tween.to, tween.remove);
            }
            !done
        });
        if !self.tweens.borrow().is_empty() {
            self.schedule();
        }
    }
}

fn finish(element: &Element, to: &Node, remove: bool) {
    if remove {
        element.remove();
        return;
    }
    for (name, value) in &to.attrs {
        set_attr(element, name, value);
    }
}

fn with_overrides(node: &Node, overrides: &[Attr]) -> Node {
    let mut node = node.clone();
    for (name, value) in overrides {
        node.set(*name, value.clone());
    }
    node
}

/// One chart's `<svg>` and what is currently bound to each of its layers.
pub struct SceneMount {
    document: Document,
    animator: Animator,
    svg: Element,
    groups: Vec<(&'static str, Element)>,
    bound: HashMap<&'static str, BoundLayer>,
    elements: HashMap<&'static str, HashMap<String, Element>>,
}

impl SceneMount {
    /// Clears `container` and mounts an empty `<svg>` in it.
    pub fn new(document: &Document, container: &Element, animator: Animator) -> Result<Self> {
        let svg = create_svg(document, "svg")?;
        container.set_text_content(None);
        append(container, &svg);
        Ok(Self {
            document: document.clone(),
            animator,
            svg,
            groups: Vec::new(),
            bound: HashMap::new(),
            elements: HashMap::new(),
        })
    }

    pub const fn svg(&self) -> &Element {
        &self.svg
    }

    pub fn render(&mut self, scene: &Scene) -> Result<()> {
        for (name, value) in scene.root_attrs() {
            set_attr(&self.svg, name, &value);
        }
        for layer in &scene.layers {
            let group = self.group(layer.name)?;
            if layer.keyed {
                self.patch_keyed(&group, layer)?;
            } else {
                group.set_text_content(None);
                for node in &layer.nodes {
                    append(&group, &build_node(&self.document, node)?);
                }
            }
        }
        Ok(())
    }

    fn group(&mut self, name: &'static str) -> Result<Element> {
        if let Some((_, group)) = self.groups.iter().find(|(existing, _)| *existing == name) {
            return Ok(group.clone());
        }
        let group = create_svg(&self.document, "g")?;
        set_attr(&group, "class", &format!("layer-{name}"));
        append(&self.svg, &group);
        self.groups.push((name, group.clone()));
        Ok(group)
    }

    fn patch_keyed(&mut self, group: &Element, layer: &Layer) -> Result<()> {
        let bound = self.bound.entry(layer.name).or_default();
        let previous = bound.clone();
        let plan = bound.join(&layer.nodes);
        let elements = self.elements.entry(layer.name).or_default();

        for key in &plan.exit {
            let (Some(element), Some(node)) = (elements.remove(key), previous.get(key)) else {
                continue;
            };
            let target = with_overrides(node, &node.exit);
            self.animator.push(element, node.attrs.clone(), target, true);
        }

        let mut ordered: Vec<usize> = plan.enter.iter().chain(&plan.update).copied().collect();
        ordered.sort_unstable();
        for index in ordered {
            let node = &layer.nodes[index];
            let key = node.key.clone().unwrap_or_else(|| format!("#{index}"));
            let (element, from) = match (elements.get(&key), previous.get(&key)) {
                (Some(element), Some(old)) => {
                    if node.text != old.text {
                        element.set_text_content(node.text.as_deref());
                    }
                    (element.clone(), old.attrs.clone())
                }
                _ => {
                    let start = with_overrides(node, &node.enter);
                    let element = build_node(&self.document, &start)?;
                    elements.insert(key, element.clone());
                    (element, start.attrs)
                }
            };
            append(group, &element);
            self.animator.push(element, from, node.clone(), false);
        }
        Ok(())
    }
}
