//! Force laws for constraint edges.
//!
//! All three constraint types share the spring law
//! `force = stiffness * (distance - rest_length)`; they differ in how the
//! rest length and the stiffness are resolved:
//!
//! | type    | rest length                         | default stiffness |
//! |---------|-------------------------------------|-------------------|
//! | elastic | `ideal_length` (200)                | 0.001             |
//! | rigid   | distance captured at registration   | 0.1               |
//! | weld    | sum of the endpoints' radii         | 0.5               |
//!
//! A positive magnitude pulls the endpoints together.

use nodeweave_core::{ConstraintEdge, ConstraintType, DEFAULT_IDEAL_LENGTH};

/// Stiffness and rest length of an edge at a given moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedConstraint {
    pub stiffness: f64,
    pub rest_length: f64,
}

impl ResolvedConstraint {
    /// Signed spring force for the given endpoint distance.
    pub fn force_magnitude(&self, distance: f64) -> f64 {
        self.stiffness * (distance - self.rest_length)
    }
}

/// Resolve the law parameters of `edge`.
///
/// `current_distance` is only consulted by rigid edges that never had their
/// rest length captured, which then exert no force.
pub fn resolve(
    edge: &ConstraintEdge,
    source_radius: f64,
    target_radius: f64,
    current_distance: f64,
) -> ResolvedConstraint {
    let params = &edge.constraint_params;
    let rest_length = match edge.constraint_type {
        ConstraintType::Elastic => params.ideal_length.unwrap_or(DEFAULT_IDEAL_LENGTH),
        ConstraintType::Rigid => params.distance.unwrap_or(current_distance),
        ConstraintType::Weld => source_radius + target_radius,
    };
    ResolvedConstraint {
        stiffness: edge.stiffness(),
        rest_length,
    }
}

/// Signed force magnitude of `edge` at `distance`.
pub fn force_magnitude(edge: &ConstraintEdge, source_radius: f64, target_radius: f64, distance: f64) -> f64 {
    resolve(edge, source_radius, target_radius, distance).force_magnitude(distance)
}

/// Store `distance` as the rest length of a rigid edge that has none.
///
/// Returns true when a value was captured.
pub fn capture_rest_distance(edge: &mut ConstraintEdge, distance: f64) -> bool {
    if edge.constraint_type != ConstraintType::Rigid || edge.constraint_params.distance.is_some() {
        return false;
    }
    edge.constraint_params.distance = Some(distance);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeweave_core::{ConstraintParams, EdgeId, EntityId};

    fn ids() -> (EdgeId, EntityId, EntityId) {
        (EdgeId(1), EntityId(1), EntityId(2))
    }

    #[test]
    fn test_elastic_uses_ideal_length() {
        let (e, a, b) = ids();
        let edge = ConstraintEdge::elastic(e, a, b, 50.0);
        let resolved = resolve(&edge, 10.0, 10.0, 80.0);
        assert_eq!(resolved.rest_length, 50.0);
        assert!((resolved.force_magnitude(80.0) - 0.03).abs() < 1e-12);
        // Compressed springs push apart.
        assert!(force_magnitude(&edge, 10.0, 10.0, 20.0) < 0.0);
    }

    #[test]
    fn test_elastic_default_ideal_length() {
        let (e, a, b) = ids();
        let edge = ConstraintEdge::new(e, a, b, ConstraintType::Elastic);
        assert_eq!(resolve(&edge, 1.0, 1.0, 0.0).rest_length, 200.0);
    }

    #[test]
    fn test_rigid_captures_once() {
        let (e, a, b) = ids();
        let mut edge = ConstraintEdge::rigid(e, a, b);
        assert_eq!(force_magnitude(&edge, 1.0, 1.0, 123.0), 0.0);

        assert!(capture_rest_distance(&mut edge, 100.0));
        assert!(!capture_rest_distance(&mut edge, 300.0));
        assert_eq!(edge.constraint_params.distance, Some(100.0));
        assert!((force_magnitude(&edge, 1.0, 1.0, 110.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weld_rest_is_touching_surfaces() {
        let (e, a, b) = ids();
        let edge = ConstraintEdge::weld(e, a, b);
        let resolved = resolve(&edge, 12.0, 8.0, 100.0);
        assert_eq!(resolved.rest_length, 20.0);
        assert_eq!(resolved.stiffness, 0.5);
        assert_eq!(resolved.force_magnitude(20.0), 0.0);
    }

    #[test]
    fn test_capture_ignores_other_types() {
        let (e, a, b) = ids();
        let mut edge = ConstraintEdge::elastic(e, a, b, 10.0)
            .with_params(ConstraintParams::default().with_ideal_length(10.0));
        assert!(!capture_rest_distance(&mut edge, 5.0));
        assert_eq!(edge.constraint_params.distance, None);
    }
}
