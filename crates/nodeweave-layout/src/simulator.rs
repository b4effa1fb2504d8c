//! O(n²) force simulation over spatial entities.

use std::collections::{HashMap, HashSet};

use nodeweave_core::{ConstraintEdge, EdgeId, EntityId, SpatialEntity, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constraint;
use crate::LayoutConfig;

/// Working set and integrator of the force-directed layout.
///
/// The simulator owns the registered entities; the render loop reads their
/// positions back through [`nodes`](Self::nodes) or [`node`](Self::node) after
/// each step. Velocities are keyed by entity id and never stored on the
/// entities themselves.
pub struct ForceSimulator<N: SpatialEntity> {
    config: LayoutConfig,
    nodes: Vec<N>,
    /// Entity id -> index into `nodes`.
    index: HashMap<EntityId, usize>,
    edges: Vec<ConstraintEdge>,
    edge_ids: HashSet<EdgeId>,
    velocities: HashMap<EntityId, Vec3>,
    pinned: HashSet<EntityId>,
    /// Per-step force accumulators, parallel to `nodes`.
    forces: Vec<Vec3>,
    rng: StdRng,
    energy: f64,
}

impl<N: SpatialEntity> ForceSimulator<N> {
    /// Create an empty simulator.
    pub fn new(config: LayoutConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            edge_ids: HashSet::new(),
            velocities: HashMap::new(),
            pinned: HashSet::new(),
            forces: Vec::new(),
            rng,
            energy: 0.0,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next step.
    pub fn set_config(&mut self, config: LayoutConfig) {
        self.config = config;
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register an entity with zero velocity.
    ///
    /// Returns false (and drops `node`) if an entity with the same id is
    /// already tracked.
    pub fn add_node(&mut self, node: N) -> bool {
        let id = node.id();
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        self.velocities.insert(id, Vec3::ZERO);
        tracing::debug!("layout: added node {} ({} total)", id, self.nodes.len());
        true
    }

    /// Unregister an entity, purging its velocity and pin state.
    ///
    /// Edges touching the entity are left in place and skipped while stepping.
    pub fn remove_node(&mut self, id: EntityId) -> Option<N> {
        let idx = self.index.remove(&id)?;
        let node = self.nodes.swap_remove(idx);
        if let Some(moved) = self.nodes.get(idx) {
            self.index.insert(moved.id(), idx);
        }
        self.velocities.remove(&id);
        self.pinned.remove(&id);
        tracing::debug!("layout: removed node {} ({} left)", id, self.nodes.len());
        Some(node)
    }

    /// Register an edge unless one with the same id is already present.
    ///
    /// Rigid edges without an explicit distance capture the current
    /// endpoint distance here.
    pub fn add_edge(&mut self, mut edge: ConstraintEdge) -> bool {
        if self.edge_ids.contains(&edge.id) {
            return false;
        }
        if let (Some(source), Some(target)) = (self.node(edge.source), self.node(edge.target)) {
            let distance = source.position().distance(target.position());
            if constraint::capture_rest_distance(&mut edge, distance) {
                tracing::debug!("layout: rigid edge {} captured rest length {:.2}", edge.id, distance);
            }
        }
        self.edge_ids.insert(edge.id);
        self.edges.push(edge);
        true
    }

    /// Unregister an edge by id.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<ConstraintEdge> {
        if !self.edge_ids.remove(&id) {
            return None;
        }
        let pos = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(pos))
    }

    /// Pin an entity in place and zero its velocity.
    pub fn fix_node(&mut self, id: EntityId) {
        if !self.index.contains_key(&id) {
            return;
        }
        self.pinned.insert(id);
        self.velocities.insert(id, Vec3::ZERO);
    }

    /// Unpin an entity. Does not wake the simulation.
    pub fn release_node(&mut self, id: EntityId) {
        self.pinned.remove(&id);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// All registered entities.
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Look up a registered entity.
    pub fn node(&self, id: EntityId) -> Option<&N> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    /// Mutable access to a registered entity, e.g. for drag updates.
    ///
    /// Changing the entity's id through this reference is not supported.
    pub fn node_mut(&mut self, id: EntityId) -> Option<&mut N> {
        let idx = *self.index.get(&id)?;
        self.nodes.get_mut(idx)
    }

    /// Whether an entity is registered.
    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of registered entities.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Registered edges.
    pub fn edges(&self) -> &[ConstraintEdge] {
        &self.edges
    }

    /// Look up a registered edge.
    pub fn edge(&self, id: EdgeId) -> Option<&ConstraintEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Current velocity of an entity.
    pub fn velocity(&self, id: EntityId) -> Option<Vec3> {
        self.velocities.get(&id).copied()
    }

    /// Whether the entity is excluded from integration.
    pub fn is_pinned(&self, id: EntityId) -> bool {
        self.pinned.contains(&id) || self.node(id).is_some_and(|n| n.is_pinned())
    }

    /// Kinetic energy after the last step.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    // =========================================================================
    // Dynamics
    // =========================================================================

    /// Add a random impulse to every non-pinned entity.
    ///
    /// Each impulse has magnitude `intensity * (1 + 2 * random)`; the Z
    /// component of its direction is scaled by `z_spread_factor`.
    pub fn perturb(&mut self, intensity: f64) {
        let z_spread = self.config.z_spread_factor;
        for node in &self.nodes {
            let id = node.id();
            if self.pinned.contains(&id) || node.is_pinned() {
                continue;
            }
            let direction = random_direction(&mut self.rng, z_spread);
            let magnitude = intensity * (1.0 + self.rng.random::<f64>() * 2.0);
            *self.velocities.entry(id).or_insert(Vec3::ZERO) += direction * magnitude;
        }
    }

    /// Advance the layout by one integration tick.
    ///
    /// Returns the total kinetic energy of the non-pinned entities.
    pub fn step(&mut self) -> f64 {
        let count = self.nodes.len();
        let Self {
            config,
            nodes,
            index,
            edges,
            velocities,
            pinned,
            forces,
            rng,
            ..
        } = self;

        forces.clear();
        forces.resize(count, Vec3::ZERO);
        let fixed: Vec<bool> = nodes
            .iter()
            .map(|n| pinned.contains(&n.id()) || n.is_pinned())
            .collect();

        // Pairwise repulsion plus overlap separation.
        let eps_sq = config.degenerate_epsilon_sq;
        for i in 0..count {
            let pos_i = nodes[i].position();
            let radius_i = nodes[i].bounding_radius();
            for j in (i + 1)..count {
                if fixed[i] && fixed[j] {
                    continue;
                }
                let mut delta = pos_i - nodes[j].position();
                let mut dist_sq = delta.length_squared();
                if dist_sq < eps_sq {
                    delta = random_direction(rng, config.z_spread_factor) * eps_sq.sqrt();
                    dist_sq = delta.length_squared();
                }
                let dist = dist_sq.sqrt();

                let mut magnitude = config.repulsion / dist_sq;
                let min_dist = (radius_i + nodes[j].bounding_radius()) * config.collision_padding;
                if dist < min_dist {
                    let overlap = min_dist - dist;
                    magnitude += config.collision_strength * overlap * overlap / dist;
                }

                let force = delta / dist * magnitude;
                forces[i] += force;
                forces[j] -= force;
            }
        }

        // Constraint springs.
        for edge in edges.iter() {
            let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) else {
                continue;
            };
            if s == t {
                continue;
            }
            let delta = nodes[t].position() - nodes[s].position();
            let dist = delta.length();
            if dist <= f64::EPSILON {
                continue;
            }
            let magnitude = constraint::force_magnitude(
                edge,
                nodes[s].bounding_radius(),
                nodes[t].bounding_radius(),
                dist,
            );
            let force = delta / dist * magnitude;
            forces[s] += force;
            forces[t] -= force;
        }

        if config.center_strength > 0.0 {
            for (i, node) in nodes.iter().enumerate() {
                if !fixed[i] {
                    forces[i] += (config.gravity_center - node.position()) * config.center_strength;
                }
            }
        }

        // Integrate.
        let mut energy = 0.0;
        for (i, node) in nodes.iter_mut().enumerate() {
            if fixed[i] {
                continue;
            }
            let mut force = forces[i];
            force.z *= config.z_spread_factor;

            let mass = node.mass();
            let velocity = velocities.entry(node.id()).or_insert(Vec3::ZERO);
            let mut next = (*velocity + force / mass) * config.damping;
            let speed = next.length();
            if speed > config.max_speed {
                next *= config.max_speed / speed;
            }
            *velocity = next;
            node.set_position(node.position() + next);
            energy += 0.5 * mass * next.length_squared();
        }

        self.energy = energy;
        tracing::trace!("layout: step energy {:.5}", energy);
        energy
    }
}

/// Random unit vector biased toward the XY plane.
fn random_direction(rng: &mut StdRng, z_spread: f64) -> Vec3 {
    let v = Vec3::new(
        rng.random_range(-1.0..=1.0),
        rng.random_range(-1.0..=1.0),
        rng.random_range(-1.0..=1.0) * z_spread,
    );
    v.try_normalize().unwrap_or(Vec3::X)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeweave_core::GraphNode;

    fn sim() -> ForceSimulator<GraphNode> {
        ForceSimulator::new(LayoutConfig::default().with_seed(1))
    }

    fn node(id: u64, x: f64) -> GraphNode {
        GraphNode::new(EntityId(id), Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut sim = sim();
        assert!(sim.add_node(node(1, 0.0)));
        assert!(!sim.add_node(node(1, 50.0)));
        assert_eq!(sim.node_count(), 1);
        assert_eq!(sim.node(EntityId(1)).unwrap().position.x, 0.0);
        assert_eq!(sim.velocity(EntityId(1)), Some(Vec3::ZERO));
    }

    #[test]
    fn test_remove_node_purges_state_and_reindexes() {
        let mut sim = sim();
        for i in 1..=3 {
            sim.add_node(node(i, i as f64 * 10.0));
        }
        sim.fix_node(EntityId(1));
        let removed = sim.remove_node(EntityId(1)).unwrap();
        assert_eq!(removed.id, EntityId(1));
        assert!(!sim.is_pinned(EntityId(1)));
        assert_eq!(sim.velocity(EntityId(1)), None);
        // The swapped-in node must still be reachable by id.
        assert_eq!(sim.node(EntityId(3)).unwrap().position.x, 30.0);
        assert_eq!(sim.node(EntityId(2)).unwrap().position.x, 20.0);
        assert!(sim.remove_node(EntityId(1)).is_none());
    }

    #[test]
    fn test_edges_are_identity_based() {
        let mut sim = sim();
        sim.add_node(node(1, 0.0));
        sim.add_node(node(2, 30.0));
        let edge = ConstraintEdge::elastic(EdgeId(9), EntityId(1), EntityId(2), 50.0);
        assert!(sim.add_edge(edge.clone()));
        assert!(!sim.add_edge(edge));
        assert!(sim.remove_edge(EdgeId(9)).is_some());
        assert!(sim.remove_edge(EdgeId(9)).is_none());
        assert!(sim.edges().is_empty());
    }

    #[test]
    fn test_rigid_edge_captures_registration_distance() {
        let mut sim = sim();
        sim.add_node(node(1, 0.0));
        sim.add_node(node(2, 75.0));
        sim.add_edge(ConstraintEdge::rigid(EdgeId(1), EntityId(1), EntityId(2)));
        let captured = sim.edge(EdgeId(1)).unwrap().constraint_params.distance;
        assert_eq!(captured, Some(75.0));
    }

    #[test]
    fn test_stale_edge_is_skipped() {
        let mut sim = sim();
        sim.add_node(node(1, 0.0));
        sim.add_node(node(2, 40.0));
        sim.add_edge(ConstraintEdge::weld(EdgeId(1), EntityId(1), EntityId(2)));
        sim.remove_node(EntityId(2));
        let energy = sim.step();
        assert!(energy.is_finite());
        assert!(sim.node(EntityId(1)).unwrap().position.is_finite());
    }

    #[test]
    fn test_fix_node_zeroes_velocity() {
        let mut sim = sim();
        sim.add_node(node(1, 0.0));
        sim.add_node(node(2, 5.0));
        sim.perturb(3.0);
        assert_ne!(sim.velocity(EntityId(1)), Some(Vec3::ZERO));
        sim.fix_node(EntityId(1));
        assert_eq!(sim.velocity(EntityId(1)), Some(Vec3::ZERO));
        sim.release_node(EntityId(1));
        assert!(!sim.is_pinned(EntityId(1)));
    }

    #[test]
    fn test_perturb_magnitude_bounds() {
        let mut sim = sim();
        for i in 0..100 {
            let n = node(i, i as f64 * 30.0);
            sim.add_node(if i % 10 == 0 { n.pinned() } else { n });
        }
        sim.perturb(2.0);
        for n in sim.nodes() {
            let speed = sim.velocity(n.id).unwrap().length();
            if n.pinned {
                assert_eq!(speed, 0.0);
            } else {
                assert!((2.0 - 1e-9..=6.0 + 1e-9).contains(&speed), "impulse {speed} out of range");
            }
        }
    }

    #[test]
    fn test_entity_pin_flag_is_respected() {
        let mut sim = sim();
        sim.add_node(node(1, 0.0).pinned());
        sim.add_node(node(2, 3.0));
        for _ in 0..10 {
            sim.step();
        }
        assert_eq!(sim.node(EntityId(1)).unwrap().position, Vec3::ZERO);
        assert!(sim.node(EntityId(2)).unwrap().position.x > 3.0);
    }

    #[test]
    fn test_z_forces_are_flattened() {
        let config = LayoutConfig {
            center_strength: 0.0,
            ..LayoutConfig::default().with_seed(3)
        };
        let mut sim = ForceSimulator::new(config);
        sim.add_node(GraphNode::new(EntityId(1), Vec3::ZERO));
        sim.add_node(GraphNode::new(EntityId(2), Vec3::new(100.0, 0.0, 100.0)));
        sim.step();
        let v = sim.velocity(EntityId(2)).unwrap();
        assert!(v.x > 0.0 && v.z > 0.0);
        assert!((v.z / v.x - 0.3).abs() < 1e-9);
    }
}
