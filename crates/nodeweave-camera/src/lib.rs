//! Camera navigation for nodeweave scenes.
//!
//! [`CameraController`] turns pointer drags and wheel deltas into camera
//! motion and exposes a [`CameraTransform`] for the renderer. It is
//! independent of the layout engine; entities are only seen through
//! [`nodeweave_core::SpatialEntity`] when focusing.
//!
//! ## Architecture
//!
//! ```text
//!  pointer / wheel                    move_to / focus / history / bookmarks
//!        │                                          │
//!        ▼                                          ▼
//! ┌────────────────┐                        ┌──────────────┐
//! │  Interaction   │── writes targets ──┐   │    Tweens    │
//! │ idle/pan/orbit │                    │   │ (ease-out)   │
//! └────────────────┘                    ▼   └──────┬───────┘
//!                              ┌──────────────────┐│ update(dt)
//!                              │   CameraState    │◀┘
//!                              │ target ─smooth─▶ │
//!                              │ current          │
//!                              └────────┬─────────┘
//!                                       ▼
//!                               CameraTransform
//! ```

mod config;
mod controller;
mod error;
mod state;
mod tween;

pub use config::CameraConfig;
pub use controller::{CameraController, Interaction};
pub use error::CameraError;
pub use state::{CameraState, CameraTransform, NamedView, ViewHistory, ViewMode, ViewSnapshot};
pub use tween::{Easing, Lerp, Tween};

/// Result type for camera operations.
pub type Result<T> = std::result::Result<T, CameraError>;
