//! Settles a small constrained graph headlessly and prints the result.
//!
//! Run with: cargo run --example settle_layout
//! Set RUST_LOG=nodeweave_layout=debug to watch kicks and convergence.

use std::time::{Duration, Instant};

use nodeweave_core::{ConstraintEdge, EdgeId, EntityId, GraphNode, Vec3};
use nodeweave_layout::{FrameOutcome, LayoutConfig, ManualClock, SchedulerConfig, SimulationScheduler};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let node_count = 60u64;
    println!("Building a ring of {} nodes with a welded hub...", node_count);

    // Nodes start on a tight spiral so repulsion has work to do.
    let mut nodes = Vec::with_capacity(node_count as usize + 1);
    for i in 0..node_count {
        let angle = i as f64 * 0.4;
        let radius = 5.0 + i as f64 * 0.5;
        nodes.push(GraphNode::new(
            EntityId(i),
            Vec3::new(radius * angle.cos(), radius * angle.sin(), (i as f64 * 1.7).sin() * 10.0),
        ));
    }
    let hub = EntityId(node_count);
    nodes.push(GraphNode::new(hub, Vec3::ZERO).with_radius(30.0).with_mass(4.0));

    let mut edges = Vec::new();
    let mut next_edge = 0u64;
    let mut edge_id = || {
        next_edge += 1;
        EdgeId(next_edge)
    };
    for i in 0..node_count {
        let next = (i + 1) % node_count;
        edges.push(ConstraintEdge::elastic(edge_id(), EntityId(i), EntityId(next), 80.0));
    }
    for i in (0..node_count).step_by(15) {
        edges.push(ConstraintEdge::rigid(edge_id(), hub, EntityId(i)));
    }
    edges.push(ConstraintEdge::weld(edge_id(), hub, EntityId(1)));

    let clock = ManualClock::new();
    let mut scheduler = SimulationScheduler::with_clock(
        LayoutConfig::default().with_seed(2024),
        SchedulerConfig::default(),
        clock.clone(),
    )?;
    for node in nodes {
        scheduler.add_node(node);
    }
    for edge in edges {
        scheduler.add_edge(edge);
    }

    let warmup = scheduler.run_once(100);
    println!("Pre-render settle: {} steps, energy {:.3}", warmup, scheduler.energy());

    // Simulate a 60 FPS render loop until the scheduler goes idle.
    let start = Instant::now();
    let mut frames = 0u32;
    loop {
        clock.advance(Duration::from_millis(16));
        frames += 1;
        match scheduler.frame() {
            FrameOutcome::Stepped { energy } if frames % 60 == 0 => {
                println!("Frame {}: energy = {:.4}", frames, energy);
            }
            FrameOutcome::Stepped { .. } => {}
            FrameOutcome::Converged { energy } => {
                println!("Converged after {} frames (energy {:.4})", frames, energy);
                break;
            }
            FrameOutcome::Idle => break,
        }
        if frames > 60 * 120 {
            println!("Gave up after {} frames", frames);
            break;
        }
    }
    let elapsed = start.elapsed();
    println!("Wall time: {:.2?} ({:.1} µs/frame)", elapsed, elapsed.as_micros() as f64 / frames as f64);

    println!("\nFinal positions (first 5 nodes):");
    for node in scheduler.simulator().nodes().iter().take(5) {
        println!(
            "  {}: ({:.2}, {:.2}, {:.2})",
            node.id, node.position.x, node.position.y, node.position.z
        );
    }
    Ok(())
}
