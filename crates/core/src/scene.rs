//! Browser-independent SVG scene produced by every chart.
//!
//! Charts build a [`Scene`]; the web adapter mounts or patches it into the
//! DOM and the CLI serializes it with [`Scene::to_svg`].

use std::fmt::Write as _;

pub type Attr = (&'static str, String);

/// Numbers in attributes are kept to two decimals.
pub fn num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" || text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub tag: &'static str,
    pub key: Option<String>,
    pub attrs: Vec<Attr>,
    pub text: Option<String>,
    pub children: Vec<Node>,
    /// Values a keyed node starts from when it first enters.
    pub enter: Vec<Attr>,
    /// Values a keyed node animates to before it is removed.
    pub exit: Vec<Attr>,
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    #[must_use]
    pub fn num(self, name: &'static str, value: f64) -> Self {
        self.attr(name, num(value))
    }

    #[must_use]
    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn on_enter(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.enter.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn on_exit(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.exit.push((name, value.into()));
        self
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn get_num(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|value| value.parse().ok())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn write_svg(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", self.tag);
        if let Some(key) = &self.key {
            let _ = write!(out, " data-key=\"{}\"", escape(key));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
        if self.children.is_empty() && self.text.is_none() {
            out.push_str("/>\n");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        if !self.children.is_empty() {
            out.push('\n');
            for child in &self.children {
                child.write_svg(out, depth + 1);
            }
            out.push_str(&indent);
        }
        let _ = writeln!(out, "</{}>", self.tag);
    }
}

/// A named `<g>` group. Keyed layers are reconciled by key on update.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: &'static str,
    pub keyed: bool,
    pub nodes: Vec<Node>,
}

impl Layer {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            keyed: false,
            nodes: Vec::new(),
        }
    }

    pub const fn keyed(name: &'static str) -> Self {
        Self {
            name,
            keyed: true,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    #[must_use]
    pub fn with(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn find(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.key.as_deref() == Some(key))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub class: &'static str,
    pub layers: Vec<Layer>,
}

impl Scene {
    pub const fn new(class: &'static str, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            class,
            layers: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn root_attrs(&self) -> Vec<Attr> {
        vec![
            ("class", self.class.to_string()),
            ("width", num(self.width)),
            ("height", num(self.height)),
            ("viewBox", format!("0 0 {} {}", num(self.width), num(self.height))),
            ("preserveAspectRatio", "xMidYMid meet".to_string()),
        ]
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        out.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\"");
        for (name, value) in self.root_attrs() {
            let _ = write!(out, " {name}=\"{}\"", escape(&value));
        }
        out.push_str(">\n");
        for layer in &self.layers {
            let _ = writeln!(out, "  <g class=\"layer-{}\">", layer.name);
            for node in &layer.nodes {
                node.write_svg(&mut out, 2);
            }
            out.push_str("  </g>\n");
        }
        out.push_str("</svg>\n");
        out
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// SVG path through `points`, or `None` with fewer than two points.
pub fn polyline_path(points: &[(f64, f64)]) -> Option<String> {
    if points.len() < 2 {
        return None;
    }
    let mut path = String::new();
    for (index, (x, y)) in points.iter().enumerate() {
        let command = if index == 0 { 'M' } else { 'L' };
        let _ = write!(path, "{command}{},{}", num(*x), num(*y));
    }
    Some(path)
}

/// Closed area between an upper and a lower edge sharing x positions.
pub fn area_path(upper: &[(f64, f64)], lower: &[(f64, f64)]) -> Option<String> {
    let mut path = polyline_path(upper)?;
    for (x, y) in lower.iter().rev() {
        let _ = write!(path, "L{},{}", num(*x), num(*y));
    }
    path.push('Z');
    Some(path)
}
