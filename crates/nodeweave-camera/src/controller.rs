//! Camera navigation state machine.
//!
//! Pointer interactions (pan, orbit) and wheel zoom write the camera targets
//! directly; transitions (`move_to` and everything built on it) tween the
//! targets over time. Both channels are last-write-wins: any new interaction
//! or transition cancels the tweens in flight. `update` advances tweens and
//! smooths the applied placement once per frame.

use std::collections::{BTreeMap, HashMap};

use nodeweave_core::{EntityId, SpatialEntity, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::state::{CameraState, CameraTransform, NamedView, ViewHistory, ViewMode, ViewSnapshot};
use crate::tween::{Easing, Tween};
use crate::Result;

/// Largest orbit pitch away from the horizon, in radians.
const MAX_PITCH: f64 = 1.55;

/// Pointer interaction currently driving the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Panning { last: Vec2 },
    Orbiting { last: Vec2 },
}

/// Interactive camera over a [`CameraState`].
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    state: CameraState,
    interaction: Interaction,
    position_tween: Option<Tween<Vec3>>,
    look_at_tween: Option<Tween<Vec3>>,
    history: ViewHistory,
    named_views: HashMap<String, NamedView>,
    current_target: Option<EntityId>,
    follow: Option<EntityId>,
    initial: Option<(Vec3, Vec3)>,
    mode: ViewMode,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::build(CameraConfig::default())
    }
}

impl CameraController {
    /// Create a controller resting at the configured default placement.
    pub fn new(config: CameraConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Create a controller resting at an explicit placement.
    pub fn with_placement(config: CameraConfig, position: Vec3, look_at: Vec3) -> Result<Self> {
        let mut controller = Self::new(config)?;
        controller.state = CameraState::at(position, look_at);
        Ok(controller)
    }

    fn build(config: CameraConfig) -> Self {
        Self {
            state: CameraState::at(config.default_position, config.default_look_at),
            history: ViewHistory::new(config.max_history),
            config,
            interaction: Interaction::Idle,
            position_tween: None,
            look_at_tween: None,
            named_views: HashMap::new(),
            current_target: None,
            follow: None,
            initial: None,
            mode: ViewMode::Perspective,
        }
    }

    // =========================================================================
    // Pointer interaction
    // =========================================================================

    /// Begin a pan drag at `pointer` (screen pixels).
    pub fn start_pan(&mut self, pointer: Vec2) {
        self.cancel_tweens();
        self.current_target = None;
        self.follow = None;
        self.interaction = Interaction::Panning { last: pointer };
    }

    /// Continue a pan drag; translates position and look-at rigidly.
    pub fn pan(&mut self, pointer: Vec2) {
        let Interaction::Panning { last } = self.interaction else {
            return;
        };
        let delta = pointer - last;
        self.interaction = Interaction::Panning { last: pointer };

        let (_, right, up) = self.state.target_basis();
        let world_per_pixel =
            2.0 * self.state.target_distance() * self.config.half_fov().tan() / self.config.viewport_height;
        let offset = -right * delta.x * world_per_pixel + up * delta.y * world_per_pixel;
        self.state.target_position += offset;
        self.state.target_look_at += offset;
    }

    pub fn end_pan(&mut self) {
        if matches!(self.interaction, Interaction::Panning { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    /// Begin an orbit drag. Ignored in planar mode.
    pub fn start_orbit(&mut self, pointer: Vec2) {
        if self.mode == ViewMode::Planar {
            return;
        }
        self.cancel_tweens();
        self.interaction = Interaction::Orbiting { last: pointer };
    }

    /// Rotate the camera around the look-at point, keeping its distance.
    pub fn orbit(&mut self, pointer: Vec2) {
        let Interaction::Orbiting { last } = self.interaction else {
            return;
        };
        self.interaction = Interaction::Orbiting { last: pointer };
        if self.mode == ViewMode::Planar {
            return;
        }
        let delta = pointer - last;

        let offset = self.state.target_position - self.state.target_look_at;
        let radius = offset.length();
        if radius <= f64::EPSILON {
            return;
        }
        let yaw = offset.x.atan2(offset.z) - delta.x * self.config.orbit_speed;
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + delta.y * self.config.orbit_speed)
            .clamp(-MAX_PITCH, MAX_PITCH);

        let rotated = Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos()) * radius;
        self.state.target_position = self.state.target_look_at + rotated;
    }

    pub fn end_orbit(&mut self) {
        if matches!(self.interaction, Interaction::Orbiting { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    /// Wheel zoom toward the point under the cursor.
    ///
    /// `cursor_ndc` is the cursor in normalized device coordinates (x right,
    /// y up, both in [-1, 1]). A positive `delta` zooms out.
    pub fn zoom(&mut self, delta: f64, cursor_ndc: Vec2) {
        self.cancel_tweens();
        self.current_target = None;

        let position = self.state.target_position;
        let look_at = self.state.target_look_at;
        let distance = self.state.target_distance();
        if distance <= f64::EPSILON {
            return;
        }
        let new_distance = (distance * self.config.zoom_base.powf(-delta * self.config.zoom_exponent))
            .clamp(self.config.min_zoom, self.config.max_zoom);
        let ratio = new_distance / distance;

        // Cursor ray against the plane through the look-at point facing the camera.
        let (forward, right, up) = self.state.target_basis();
        let tan_half = self.config.half_fov().tan();
        let ray = forward + right * (cursor_ndc.x * tan_half * self.config.aspect) + up * (cursor_ndc.y * tan_half);
        let denom = ray.dot(forward);
        let anchor = if denom > f64::EPSILON {
            position + ray * (distance / denom)
        } else {
            look_at
        };

        self.state.target_position = anchor + (position - anchor) * ratio;
        self.state.target_look_at = anchor + (look_at - anchor) * ratio;
        tracing::trace!("camera: zoom {:.2} -> {:.2}", distance, new_distance);
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Animate the targets to a new placement over `duration` seconds (0 is instant).
    pub fn move_to(&mut self, position: Vec3, look_at: Vec3, duration: f64) {
        if self.initial.is_none() {
            self.initial = Some((self.state.target_position, self.state.target_look_at));
        }
        self.follow = None;
        self.transition(position, look_at, duration);
    }

    /// Return to the initial placement, clearing history and the target lock.
    pub fn reset_view(&mut self, duration: f64) {
        let (position, look_at) = self
            .initial
            .unwrap_or((self.config.default_position, self.config.default_look_at));
        self.history.clear();
        self.current_target = None;
        self.follow = None;
        tracing::debug!("camera: reset view");
        self.transition(position, look_at, duration);
    }

    /// Push the current target placement onto the view history.
    pub fn push_state(&mut self) {
        let snapshot = ViewSnapshot {
            position: self.state.target_position,
            look_at: self.state.target_look_at,
            target_entity: self.current_target,
        };
        if self.history.push(snapshot).is_some() {
            tracing::trace!(
                "camera: view history full ({}), dropped oldest",
                self.history.capacity()
            );
        }
    }

    /// Restore the most recent history entry, or reset when the history is empty.
    pub fn pop_state(&mut self, duration: f64) {
        match self.history.pop() {
            Some(snapshot) => {
                self.move_to(snapshot.position, snapshot.look_at, duration);
                self.current_target = snapshot.target_entity;
            }
            None => self.reset_view(duration),
        }
    }

    /// Frame `entity` so its bounding sphere fills a comfortable part of the view.
    pub fn focus_on_node<E: SpatialEntity>(&mut self, entity: &E, duration: f64, push_history: bool) {
        if push_history {
            self.push_state();
        }
        let distance = self.focus_distance(entity.bounding_radius());
        let center = entity.position();
        tracing::debug!("camera: focus on {} at distance {:.2}", entity.id(), distance);
        self.move_to(center + Vec3::Z * distance, center, duration);
    }

    /// Viewing distance used to frame a sphere of `radius`.
    pub fn focus_distance(&self, radius: f64) -> f64 {
        let distance = radius * self.config.focus_size_factor / self.config.half_fov().tan() + self.config.focus_padding;
        distance.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    /// Zoom onto `entity`, or back out if it is already the zoom target.
    ///
    /// Returns `true` when the camera zoomed in.
    pub fn auto_zoom_toggle<E: SpatialEntity>(&mut self, entity: &E, duration: f64) -> bool {
        let id = entity.id();
        if self.current_target == Some(id) {
            self.pop_state(duration);
            self.current_target = None;
            false
        } else {
            self.push_state();
            self.current_target = Some(id);
            self.focus_on_node(entity, duration, false);
            true
        }
    }

    fn transition(&mut self, position: Vec3, look_at: Vec3, duration: f64) {
        self.cancel_tweens();
        if duration <= 0.0 {
            self.state.target_position = position;
            self.state.target_look_at = look_at;
            return;
        }
        self.position_tween = Some(Tween::new(
            self.state.target_position,
            position,
            duration,
            Easing::EaseOutCubic,
        ));
        self.look_at_tween = Some(Tween::new(
            self.state.target_look_at,
            look_at,
            duration,
            Easing::EaseOutCubic,
        ));
    }

    fn cancel_tweens(&mut self) {
        self.position_tween = None;
        self.look_at_tween = None;
    }

    // =========================================================================
    // Named views
    // =========================================================================

    /// Bookmark the current target placement and mode, overwriting any view with the same name.
    pub fn save_named_view(&mut self, name: impl Into<String>) {
        let view = NamedView {
            position: self.state.target_position,
            look_at: self.state.target_look_at,
            mode: self.mode,
        };
        self.named_views.insert(name.into(), view);
    }

    /// Move to a bookmarked view. Returns `false` if no view has that name.
    pub fn restore_named_view(&mut self, name: &str, duration: f64) -> bool {
        let Some(view) = self.named_views.get(name).copied() else {
            return false;
        };
        self.mode = view.mode;
        self.move_to(view.position, view.look_at, duration);
        true
    }

    pub fn delete_named_view(&mut self, name: &str) -> bool {
        self.named_views.remove(name).is_some()
    }

    pub fn has_named_view(&self, name: &str) -> bool {
        self.named_views.contains_key(name)
    }

    pub fn named_view(&self, name: &str) -> Option<&NamedView> {
        self.named_views.get(name)
    }

    /// Bookmark names in sorted order.
    pub fn named_view_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named_views.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Serialize all bookmarks as a JSON object keyed by name.
    pub fn export_named_views(&self) -> Result<String> {
        let sorted: BTreeMap<&String, &NamedView> = self.named_views.iter().collect();
        Ok(serde_json::to_string_pretty(&sorted)?)
    }

    /// Merge bookmarks from JSON, overwriting same-named views. Returns how many were read.
    pub fn import_named_views(&mut self, json: &str) -> Result<usize> {
        let views: HashMap<String, NamedView> = serde_json::from_str(json)?;
        let count = views.len();
        self.named_views.extend(views);
        tracing::debug!("camera: imported {} named views", count);
        Ok(count)
    }

    // =========================================================================
    // Follow mode
    // =========================================================================

    /// Keep the camera trained on `id`; positions are fed through [`sync_follow`](Self::sync_follow).
    pub fn follow(&mut self, id: EntityId) {
        self.follow = Some(id);
    }

    pub fn unfollow(&mut self) {
        self.follow = None;
    }

    pub fn following(&self) -> Option<EntityId> {
        self.follow
    }

    /// Translate the camera so it keeps its offset to the followed entity.
    ///
    /// Returns `false` when `id` is not being followed or a transition is running.
    pub fn sync_follow(&mut self, id: EntityId, position: Vec3) -> bool {
        if self.follow != Some(id) || self.is_transitioning() {
            return false;
        }
        let delta = position - self.state.target_look_at;
        self.state.target_position += delta;
        self.state.target_look_at = position;
        true
    }

    // =========================================================================
    // Frame update
    // =========================================================================

    /// Advance tweens by `dt` seconds, smooth, and return the transform to render.
    pub fn update(&mut self, dt: f64) -> CameraTransform {
        if let Some(tween) = self.position_tween.as_mut() {
            self.state.target_position = tween.advance(dt);
            if tween.is_finished() {
                self.position_tween = None;
            }
        }
        if let Some(tween) = self.look_at_tween.as_mut() {
            self.state.target_look_at = tween.advance(dt);
            if tween.is_finished() {
                self.look_at_tween = None;
            }
        }
        self.state.smooth(self.config.smoothing);
        self.state.transform()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn is_transitioning(&self) -> bool {
        self.position_tween.is_some() || self.look_at_tween.is_some()
    }

    pub fn history(&self) -> &ViewHistory {
        &self.history
    }

    pub fn current_target(&self) -> Option<EntityId> {
        self.current_target
    }

    pub fn initial_placement(&self) -> Option<(Vec3, Vec3)> {
        self.initial
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch navigation mode. Entering planar mode swings the camera above the look-at point.
    pub fn set_mode(&mut self, mode: ViewMode, duration: f64) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if mode == ViewMode::Planar {
            self.end_orbit();
            let look_at = self.state.target_look_at;
            let distance = self.state.target_distance();
            self.transition(look_at + Vec3::Z * distance, look_at, duration);
        }
    }

    /// Track a resized viewport.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.config.aspect = width / height;
            self.config.viewport_height = height;
        }
    }
}
