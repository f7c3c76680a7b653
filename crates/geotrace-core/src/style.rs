//! Choropleth styling for state shapes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

/// Stroke and fill attributes of a rendered shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStyle {
    /// Border width in pixels
    pub weight: f32,
    /// Border opacity
    pub opacity: f32,
    /// Border color
    pub color: Rgb,
    pub fill_opacity: f32,
    pub fill_color: Rgb,
}

/// Pointer state of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Default,
    Hover,
}

/// Translucent green fill with a dark green border
const DEFAULT_STYLE: FeatureStyle = FeatureStyle {
    weight: 3.0,
    opacity: 0.5,
    color: Rgb::from_hex(0x008f68),
    fill_opacity: 0.8,
    fill_color: Rgb::from_hex(0x6db65b),
};

/// Opaque yellow fill with a gold border
const HOVER_STYLE: FeatureStyle = FeatureStyle {
    weight: 10.0,
    opacity: 1.0,
    color: Rgb::from_hex(0xdfa612),
    fill_opacity: 1.0,
    fill_color: Rgb::from_hex(0xfae042),
};

/// Style for a hover state. Returns a fresh value on every call.
pub fn style_for(state: HoverState) -> FeatureStyle {
    match state {
        HoverState::Default => DEFAULT_STYLE,
        HoverState::Hover => HOVER_STYLE,
    }
}

/// Per-shape style storage; each shape owns its own value
#[derive(Debug, Clone, Default)]
pub struct ShapeStyles {
    styles: HashMap<Uuid, FeatureStyle>,
}

impl ShapeStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a shape with the default style
    pub fn insert(&mut self, id: Uuid) {
        self.styles.insert(id, style_for(HoverState::Default));
    }

    pub fn clear(&mut self) {
        self.styles.clear();
    }

    pub fn get(&self, id: Uuid) -> Option<&FeatureStyle> {
        self.styles.get(&id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Pointer entered the shape
    pub fn hover_enter(&mut self, id: Uuid) {
        self.apply(id, HoverState::Hover);
    }

    /// Pointer left the shape
    pub fn hover_leave(&mut self, id: Uuid) {
        self.apply(id, HoverState::Default);
    }

    pub fn apply_transition(&mut self, transition: HoverTransition) {
        match transition {
            HoverTransition::Enter(id) => self.hover_enter(id),
            HoverTransition::Leave(id) => self.hover_leave(id),
        }
    }

    fn apply(&mut self, id: Uuid, state: HoverState) {
        if let Some(style) = self.styles.get_mut(&id) {
            *style = style_for(state);
        }
    }
}

/// Pointer enter/leave for a single shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTransition {
    Enter(Uuid),
    Leave(Uuid),
}

/// Turns "shape under the pointer" samples into enter/leave transitions
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    hovered: Option<Uuid>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<Uuid> {
        self.hovered
    }

    /// Report the shape currently under the pointer.
    ///
    /// Leave always precedes Enter when the pointer crosses between shapes.
    pub fn update(&mut self, under_pointer: Option<Uuid>) -> Vec<HoverTransition> {
        if under_pointer == self.hovered {
            return Vec::new();
        }

        let mut transitions = Vec::with_capacity(2);
        if let Some(previous) = self.hovered {
            transitions.push(HoverTransition::Leave(previous));
        }
        if let Some(next) = under_pointer {
            transitions.push(HoverTransition::Enter(next));
        }
        self.hovered = under_pointer;
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_lookup() {
        let default = style_for(HoverState::Default);
        assert_eq!(default.color, Rgb(0x00, 0x8f, 0x68));
        assert_eq!(default.fill_color, Rgb(0x6d, 0xb6, 0x5b));
        assert_eq!(default.weight, 3.0);

        let hover = style_for(HoverState::Hover);
        assert_eq!(hover.color, Rgb(0xdf, 0xa6, 0x12));
        assert_eq!(hover.fill_opacity, 1.0);
    }

    #[test]
    fn test_enter_then_leave_restores_default() {
        let id = Uuid::new_v4();
        let mut styles = ShapeStyles::new();
        styles.insert(id);
        let before = *styles.get(id).unwrap();

        styles.hover_enter(id);
        assert_eq!(styles.get(id), Some(&style_for(HoverState::Hover)));
        styles.hover_leave(id);

        assert_eq!(styles.get(id), Some(&before));
        styles.hover_leave(id);
        assert_eq!(styles.get(id), Some(&before));
    }

    #[test]
    fn test_hover_does_not_leak_across_shapes() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut styles = ShapeStyles::new();
        styles.insert(a);
        styles.insert(b);

        styles.hover_enter(a);

        assert_eq!(styles.get(a), Some(&style_for(HoverState::Hover)));
        assert_eq!(styles.get(b), Some(&style_for(HoverState::Default)));
    }

    #[test]
    fn test_tracker_emits_leave_before_enter() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut tracker = HoverTracker::new();

        assert_eq!(tracker.update(Some(a)), vec![HoverTransition::Enter(a)]);
        assert!(tracker.update(Some(a)).is_empty());
        assert_eq!(
            tracker.update(Some(b)),
            vec![HoverTransition::Leave(a), HoverTransition::Enter(b)]
        );
        assert_eq!(tracker.update(None), vec![HoverTransition::Leave(b)]);
        assert_eq!(tracker.hovered(), None);
    }
}
