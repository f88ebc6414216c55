//! The one floating tooltip shared by every chart.

/// Distance between the pointer and the tooltip's top-left corner.
pub const POINTER_OFFSET: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TooltipContent {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl TooltipContent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((label.into(), value.into()));
        self
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(row_label, _)| row_label == label)
            .map(|(_, value)| value.as_str())
    }

    pub fn to_plain_text(&self) -> String {
        let mut text = self.title.clone();
        for (label, value) in &self.rows {
            text.push('\n');
            text.push_str(label);
            text.push_str(": ");
            text.push_str(value);
        }
        text
    }
}

/// Tooltip content anchored at a point in chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Callout {
    pub content: TooltipContent,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tooltip {
    content: Option<TooltipContent>,
    position: (f64, f64),
}

impl Tooltip {
    pub const fn is_visible(&self) -> bool {
        self.content.is_some()
    }

    pub const fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }

    pub const fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Replaces whatever is showing; the latest caller wins.
    pub fn show(&mut self, content: TooltipContent) {
        self.content = Some(content);
    }

    pub fn hide(&mut self) {
        self.content = None;
    }

    /// Places the tooltip next to the pointer, flipped to stay in view.
    pub fn move_to(&mut self, pointer: (f64, f64), size: (f64, f64), viewport: Viewport) {
        self.position = place(pointer, size, viewport);
    }
}

pub fn place(pointer: (f64, f64), size: (f64, f64), viewport: Viewport) -> (f64, f64) {
    let (px, py) = pointer;
    let (width, height) = size;

    let mut x = px + POINTER_OFFSET;
    if x + width > viewport.width {
        x = px - POINTER_OFFSET - width;
    }
    let mut y = py + POINTER_OFFSET;
    if y + height > viewport.height {
        y = py - POINTER_OFFSET - height;
    }
    (
        x.clamp(0.0, (viewport.width - width).max(0.0)),
        y.clamp(0.0, (viewport.height - height).max(0.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn show_and_hide_are_idempotent() {
        let mut tooltip = Tooltip::default();
        tooltip.hide();
        assert!(!tooltip.is_visible());

        tooltip.show(TooltipContent::new("2019"));
        tooltip.show(TooltipContent::new("2020"));
        assert_eq!(tooltip.content().map(|c| c.title.as_str()), Some("2020"));

        tooltip.hide();
        tooltip.hide();
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn placement_offsets_from_pointer() {
        assert_eq!(place((100.0, 100.0), (120.0, 60.0), VIEW), (114.0, 114.0));
    }

    #[test]
    fn placement_flips_near_edges() {
        let (x, y) = place((790.0, 590.0), (120.0, 60.0), VIEW);
        assert_eq!((x, y), (656.0, 516.0));
    }

    #[test]
    fn plain_text_lists_rows() {
        let content = TooltipContent::new("2020").row("Points", "112.1");
        assert_eq!(content.to_plain_text(), "2020\nPoints: 112.1");
        assert_eq!(content.value_of("Points"), Some("112.1"));
    }
}
