//! Force-directed 3D layout for node-link graphs.
//!
//! Entities repel each other, constraint edges pull them toward a rest length,
//! and a weak center force keeps the whole layout from drifting away. The
//! simulation is frame-driven and single-threaded: the host calls
//! [`SimulationScheduler::frame`] once per rendered frame and reads entity
//! positions afterwards.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    SimulationScheduler                       │
//! │   kick / start / stop / frame / run_once / auto-stop         │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ step()
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ForceSimulator                          │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐       │
//! │  │  Repulsion  │───▶│ Constraints │───▶│  Integrate  │       │
//! │  │ + overlap   │    │ (springs)   │    │ damp, clamp │       │
//! │  └─────────────┘    └─────────────┘    └─────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!              entity positions read by the renderer
//! ```
//!
//! ## Complexity
//!
//! Repulsion is evaluated for every pair, O(n²) per step. The engine targets
//! interactive scenes of up to a few hundred entities.

mod clock;
pub mod constraint;
mod config;
mod error;
mod scheduler;
mod simulator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LayoutConfig, SchedulerConfig};
pub use constraint::ResolvedConstraint;
pub use error::LayoutError;
pub use scheduler::{FrameOutcome, LayoutState, SimulationScheduler};
pub use simulator::ForceSimulator;

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
