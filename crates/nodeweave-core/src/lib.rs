//! Core data model shared across the nodeweave workspace.
//!
//! The layout engine and the camera controller only ever see entities through
//! the [`SpatialEntity`] capability trait, so any node type (rendered card,
//! sphere, imported record) can take part in a simulation. [`GraphNode`] is the
//! plain implementation used by persistence and tests.

use serde::{Deserialize, Serialize};

mod snapshot;

pub use snapshot::{GraphSnapshot, SnapshotError};

/// 3D vector type used for positions, velocities and forces.
pub type Vec3 = glam::DVec3;

/// 2D vector type used for screen-space pointer coordinates.
pub type Vec2 = glam::DVec2;

/// Lower bound applied to entity masses at construction time.
pub const MIN_MASS: f64 = 0.1;

/// Mass given to entities that do not specify one.
pub const DEFAULT_MASS: f64 = 1.0;

/// Bounding-sphere radius given to entities that do not specify one.
pub const DEFAULT_RADIUS: f64 = 10.0;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier for entities taking part in a layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Identifier for constraint edges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// =============================================================================
// Spatial entities
// =============================================================================

/// Capability interface of anything the layout engine can move.
///
/// Velocities are deliberately absent: they belong to the simulator that is
/// currently driving the entity, so the same entity can be handed to another
/// simulation without carrying stale motion.
pub trait SpatialEntity {
    /// Stable identifier of the entity.
    fn id(&self) -> EntityId;

    /// Current position in world space.
    fn position(&self) -> Vec3;

    /// Overwrite the position (simulation step or direct drag).
    fn set_position(&mut self, position: Vec3);

    /// Mass used to turn forces into accelerations.
    fn mass(&self) -> f64 {
        DEFAULT_MASS
    }

    /// Radius of the sphere enclosing the entity's visual representation.
    fn bounding_radius(&self) -> f64 {
        DEFAULT_RADIUS
    }

    /// Whether the entity itself asks to stay in place.
    fn is_pinned(&self) -> bool {
        false
    }
}

/// Plain spatial entity matching the persisted node shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier for this node.
    pub id: EntityId,
    /// World-space position.
    #[serde(default)]
    pub position: Vec3,
    /// Mass, floored to [`MIN_MASS`].
    #[serde(default = "default_mass")]
    pub mass: f64,
    /// Whether the node is fixed in place.
    #[serde(default)]
    pub pinned: bool,
    /// Bounding-sphere radius.
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_mass() -> f64 {
    DEFAULT_MASS
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

impl GraphNode {
    /// Create an unpinned node with default mass and radius.
    pub fn new(id: EntityId, position: Vec3) -> Self {
        Self {
            id,
            position,
            mass: DEFAULT_MASS,
            pinned: false,
            radius: DEFAULT_RADIUS,
        }
    }

    /// Builder: set the mass (floored to [`MIN_MASS`]).
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = floor_mass(mass);
        self
    }

    /// Builder: set the bounding radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    /// Builder: mark the node as pinned.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Re-apply construction invariants after external deserialization.
    pub fn sanitize(&mut self) {
        self.mass = floor_mass(self.mass);
        if !self.radius.is_finite() || self.radius < 0.0 {
            self.radius = DEFAULT_RADIUS;
        }
    }
}

fn floor_mass(mass: f64) -> f64 {
    if mass.is_nan() {
        DEFAULT_MASS
    } else {
        mass.max(MIN_MASS)
    }
}

impl SpatialEntity for GraphNode {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn bounding_radius(&self) -> f64 {
        self.radius
    }

    fn is_pinned(&self) -> bool {
        self.pinned
    }
}

// =============================================================================
// Constraint edges
// =============================================================================

/// Force law family carried by an edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    /// Soft spring toward an ideal length.
    #[default]
    Elastic,
    /// Stiff spring holding the length measured at creation.
    Rigid,
    /// Spring pulling the two bounding spheres into contact.
    Weld,
}

impl ConstraintType {
    /// Stiffness used when the edge does not carry one.
    pub fn default_stiffness(self) -> f64 {
        match self {
            ConstraintType::Elastic => 0.001,
            ConstraintType::Rigid => 0.1,
            ConstraintType::Weld => 0.5,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            ConstraintType::Elastic => "elastic",
            ConstraintType::Rigid => "rigid",
            ConstraintType::Weld => "weld",
        }
    }
}

/// Ideal length of elastic edges that do not carry one.
pub const DEFAULT_IDEAL_LENGTH: f64 = 200.0;

/// Per-edge parameters; which fields matter depends on the constraint type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintParams {
    /// Spring constant; falls back to [`ConstraintType::default_stiffness`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    /// Rest length of elastic edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_length: Option<f64>,
    /// Rest length of rigid edges, captured when the edge is registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl ConstraintParams {
    /// Builder: explicit stiffness.
    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = Some(stiffness);
        self
    }

    /// Builder: explicit ideal length.
    pub fn with_ideal_length(mut self, ideal_length: f64) -> Self {
        self.ideal_length = Some(ideal_length);
        self
    }

    /// Builder: explicit rigid distance.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }
}

/// Edge carrying a spring-like force law between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintEdge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    /// Source endpoint.
    pub source: EntityId,
    /// Target endpoint.
    pub target: EntityId,
    /// Force law family.
    #[serde(default)]
    pub constraint_type: ConstraintType,
    /// Law parameters.
    #[serde(default)]
    pub constraint_params: ConstraintParams,
}

impl ConstraintEdge {
    /// Create an edge with default parameters for its type.
    pub fn new(id: EdgeId, source: EntityId, target: EntityId, constraint_type: ConstraintType) -> Self {
        Self {
            id,
            source,
            target,
            constraint_type,
            constraint_params: ConstraintParams::default(),
        }
    }

    /// Elastic edge with the given ideal length.
    pub fn elastic(id: EdgeId, source: EntityId, target: EntityId, ideal_length: f64) -> Self {
        Self::new(id, source, target, ConstraintType::Elastic)
            .with_params(ConstraintParams::default().with_ideal_length(ideal_length))
    }

    /// Rigid edge; its rest length is captured when registered with a simulator.
    pub fn rigid(id: EdgeId, source: EntityId, target: EntityId) -> Self {
        Self::new(id, source, target, ConstraintType::Rigid)
    }

    /// Weld edge.
    pub fn weld(id: EdgeId, source: EntityId, target: EntityId) -> Self {
        Self::new(id, source, target, ConstraintType::Weld)
    }

    /// Builder: replace the parameters.
    pub fn with_params(mut self, params: ConstraintParams) -> Self {
        self.constraint_params = params;
        self
    }

    /// Stiffness after applying the type default.
    pub fn stiffness(&self) -> f64 {
        self.constraint_params
            .stiffness
            .unwrap_or_else(|| self.constraint_type.default_stiffness())
    }

    /// Whether both endpoints are the same entity.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Whether the edge touches the given entity.
    pub fn touches(&self, id: EntityId) -> bool {
        self.source == id || self.target == id
    }

    /// Endpoints as an order-independent key.
    pub fn endpoint_key(&self) -> (EntityId, EntityId) {
        if self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_is_floored() {
        let node = GraphNode::new(EntityId(1), Vec3::ZERO).with_mass(0.0);
        assert_eq!(node.mass, MIN_MASS);

        let mut raw = GraphNode::new(EntityId(2), Vec3::ZERO);
        raw.mass = -3.0;
        raw.sanitize();
        assert_eq!(raw.mass, MIN_MASS);
    }

    #[test]
    fn test_entities_fall_back_to_default_radius() {
        struct Marker(Vec3);

        impl SpatialEntity for Marker {
            fn id(&self) -> EntityId {
                EntityId(0)
            }
            fn position(&self) -> Vec3 {
                self.0
            }
            fn set_position(&mut self, position: Vec3) {
                self.0 = position;
            }
        }

        let marker = Marker(Vec3::ONE);
        assert_eq!(marker.bounding_radius(), DEFAULT_RADIUS);
        assert_eq!(marker.mass(), DEFAULT_MASS);
        assert!(!marker.is_pinned());

        let node: GraphNode = serde_json::from_str(r#"{"id": 5}"#).unwrap();
        assert_eq!(node.bounding_radius(), DEFAULT_RADIUS);
    }

    #[test]
    fn test_default_stiffness_per_type() {
        let a = EntityId(1);
        let b = EntityId(2);
        assert_eq!(ConstraintEdge::elastic(EdgeId(1), a, b, 50.0).stiffness(), 0.001);
        assert_eq!(ConstraintEdge::rigid(EdgeId(2), a, b).stiffness(), 0.1);
        assert_eq!(ConstraintEdge::weld(EdgeId(3), a, b).stiffness(), 0.5);

        let custom = ConstraintEdge::weld(EdgeId(4), a, b)
            .with_params(ConstraintParams::default().with_stiffness(0.2));
        assert_eq!(custom.stiffness(), 0.2);
    }

    #[test]
    fn test_endpoint_key_is_unordered() {
        let forward = ConstraintEdge::rigid(EdgeId(1), EntityId(3), EntityId(7));
        let backward = ConstraintEdge::rigid(EdgeId(2), EntityId(7), EntityId(3));
        assert_eq!(forward.endpoint_key(), backward.endpoint_key());
        assert!(!forward.is_self_loop());
        assert!(forward.touches(EntityId(7)));
    }

    #[test]
    fn test_edge_json_shape() {
        let json = r#"{"id":4,"source":1,"target":2,"constraintType":"rigid","constraintParams":{"stiffness":0.3,"distance":80.0}}"#;
        let edge: ConstraintEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.constraint_type, ConstraintType::Rigid);
        assert_eq!(edge.constraint_params.distance, Some(80.0));
        assert_eq!(edge.stiffness(), 0.3);
    }
}
