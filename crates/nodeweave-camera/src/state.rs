//! Camera state, snapshots and the bounded view history.

use std::collections::VecDeque;

use glam::DMat4;
use nodeweave_core::{EntityId, Vec3};
use serde::{Deserialize, Serialize};

/// Navigation mode stored with named views.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Full 3D navigation, orbiting allowed.
    #[default]
    Perspective,
    /// Top-down navigation; orbit drags are ignored.
    Planar,
}

/// Smoothed and target camera placement.
///
/// Interactions write the targets; [`smooth`](Self::smooth) pulls the current
/// values toward them once per frame and only the current values are applied
/// to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub current_position: Vec3,
    pub current_look_at: Vec3,
    pub target_position: Vec3,
    pub target_look_at: Vec3,
}

impl CameraState {
    /// State at rest at the given placement.
    pub fn at(position: Vec3, look_at: Vec3) -> Self {
        Self {
            current_position: position,
            current_look_at: look_at,
            target_position: position,
            target_look_at: look_at,
        }
    }

    /// Exponentially damp the current values toward the targets.
    pub fn smooth(&mut self, factor: f64) {
        self.current_position += (self.target_position - self.current_position) * factor;
        self.current_look_at += (self.target_look_at - self.current_look_at) * factor;
    }

    /// Jump the current values onto the targets.
    pub fn settle(&mut self) {
        self.current_position = self.target_position;
        self.current_look_at = self.target_look_at;
    }

    /// Distance between the target position and the target look-at point.
    pub fn target_distance(&self) -> f64 {
        self.target_position.distance(self.target_look_at)
    }

    /// Orthonormal (forward, right, up) basis of the target placement.
    pub fn target_basis(&self) -> (Vec3, Vec3, Vec3) {
        basis(self.target_position, self.target_look_at)
    }

    /// Transform to hand to the renderer.
    pub fn transform(&self) -> CameraTransform {
        let (_, _, up) = basis(self.current_position, self.current_look_at);
        CameraTransform {
            position: self.current_position,
            look_at: self.current_look_at,
            up,
        }
    }
}

pub(crate) fn basis(position: Vec3, look_at: Vec3) -> (Vec3, Vec3, Vec3) {
    let forward = (look_at - position).try_normalize().unwrap_or(Vec3::NEG_Z);
    let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
    let up = right.cross(forward);
    (forward, right, up)
}

/// Camera transform derived from the smoothed state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
}

impl CameraTransform {
    /// Right-handed view matrix.
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.look_at, self.up)
    }
}

/// Entry of the view history stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Entity the camera was zoomed onto when the snapshot was taken.
    pub target_entity: Option<EntityId>,
}

/// User-labeled camera bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NamedView {
    pub position: Vec3,
    pub look_at: Vec3,
    #[serde(default)]
    pub mode: ViewMode,
}

/// Bounded LIFO of view snapshots; the oldest entry is evicted when full.
#[derive(Debug, Clone)]
pub struct ViewHistory {
    entries: VecDeque<ViewSnapshot>,
    capacity: usize,
}

impl ViewHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Push a snapshot, returning the evicted oldest entry if the stack was full.
    pub fn push(&mut self, snapshot: ViewSnapshot) -> Option<ViewSnapshot> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(snapshot);
        evicted
    }

    /// Pop the most recent snapshot.
    pub fn pop(&mut self) -> Option<ViewSnapshot> {
        self.entries.pop_back()
    }

    /// Most recent snapshot without removing it.
    pub fn peek(&self) -> Option<&ViewSnapshot> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ViewSnapshot> {
        self.entries.iter()
    }
}
