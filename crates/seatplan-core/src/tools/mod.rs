//! Placement tools and per-shape style memory.

use crate::markers::{MarkerColor, MarkerRole, MarkerStyle, ShapeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Supplies the initial style for each shape kind.
pub trait StyleProvider {
    fn style_for(&self, kind: ShapeKind) -> MarkerStyle;
}

/// Built-in palette: seats are blue, sofas amber, section shapes slate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyles;

impl StyleProvider for DefaultStyles {
    fn style_for(&self, kind: ShapeKind) -> MarkerStyle {
        match kind {
            ShapeKind::Seat | ShapeKind::Circle => MarkerStyle::default(),
            ShapeKind::Sofa => MarkerStyle {
                fill_color: MarkerColor::rgb(0xf5, 0x9e, 0x0b),
                stroke_color: MarkerColor::rgb(0xb4, 0x53, 0x09),
                rotation: 0.0,
            },
            ShapeKind::Rectangle
            | ShapeKind::Ellipse
            | ShapeKind::Polygon
            | ShapeKind::Freeform => MarkerStyle {
                fill_color: MarkerColor::rgb(0x94, 0xa3, 0xb8).with_opacity(0.5),
                stroke_color: MarkerColor::rgb(0x47, 0x55, 0x69),
                rotation: 0.0,
            },
        }
    }
}

/// Tracks the active placement tool, the layer it places on, and the last
/// style used per shape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolManager {
    /// Shape placed on canvas click, or None for the pointer tool.
    pub current_tool: Option<ShapeKind>,
    /// Layer clicks and marquee selections act on.
    pub layer: MarkerRole,
    /// Return to the pointer tool after placing a marker.
    pub revert_to_pointer: bool,
    defaults: HashMap<ShapeKind, MarkerStyle>,
    last_styles: HashMap<ShapeKind, MarkerStyle>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::with_provider(&DefaultStyles)
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tool manager seeded from a style provider.
    pub fn with_provider(provider: &dyn StyleProvider) -> Self {
        let defaults = ShapeKind::ALL
            .into_iter()
            .map(|kind| (kind, provider.style_for(kind)))
            .collect();
        Self {
            current_tool: None,
            layer: MarkerRole::Seat,
            revert_to_pointer: false,
            defaults,
            last_styles: HashMap::new(),
        }
    }

    /// Set the current tool (None selects the pointer).
    pub fn set_tool(&mut self, tool: Option<ShapeKind>) {
        self.current_tool = tool;
    }

    /// Check whether a placement tool is active.
    pub fn is_placing(&self) -> bool {
        self.current_tool.is_some()
    }

    /// Called after a marker has been placed.
    pub fn placed(&mut self) {
        if self.revert_to_pointer {
            self.current_tool = None;
        }
    }

    /// Remember a style as the last one used for a shape kind.
    pub fn remember_style(&mut self, kind: ShapeKind, style: MarkerStyle) {
        self.last_styles.insert(kind, style);
    }

    /// Forget all remembered styles.
    pub fn reset_styles(&mut self) {
        self.last_styles.clear();
    }
}

impl StyleProvider for ToolManager {
    /// Last style used for the kind, falling back to the seeded default.
    fn style_for(&self, kind: ShapeKind) -> MarkerStyle {
        self.last_styles
            .get(&kind)
            .or_else(|| self.defaults.get(&kind))
            .cloned()
            .unwrap_or_default()
    }
}
