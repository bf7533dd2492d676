//! SeatPlan Core Library
//!
//! Platform-agnostic core of the SeatPlan venue layout designer: markers in
//! percentage space, letterboxed coordinate mapping, alignment, undo/redo, and
//! the event reducer that drives placement, selection and dragging.

pub mod align;
pub mod camera;
pub mod config;
pub mod designer;
pub mod history;
pub mod layout;
pub mod markers;
pub mod selection;
pub mod storage;
pub mod store;
pub mod tools;

pub use align::{AlignOp, UnknownAlignOp, apply_alignment};
pub use camera::Camera;
pub use config::{ConfigError, ConfigResult, DesignerConfig};
pub use designer::{Designer, DesignerEvent, LayoutState, Outcome};
pub use history::{History, SharedHistory, Snapshotter};
pub use layout::{Letterbox, layer_to_percentage, percentage_to_stage, stage_to_percentage};
pub use markers::{
    BoundsDefaults, Marker, MarkerBounds, MarkerColor, MarkerId, MarkerPatch, MarkerRole,
    MarkerShape, MarkerStyle, ShapeKind, marker_bounds,
};
pub use selection::{DragState, MarqueeState, Selection};
pub use storage::{LayoutStorage, MemoryStorage, SaveTracker, StorageError, StorageResult};
pub use store::MarkerStore;
pub use tools::{DefaultStyles, StyleProvider, ToolManager};
