//! Frame-driven scheduling of the force simulation.
//!
//! The host render loop calls [`SimulationScheduler::frame`] once per displayed
//! frame. The scheduler decides whether a step runs and goes idle once the
//! layout has been calm for long enough after the last kick; a single
//! low-energy frame right after a kick never stops it.

use std::time::Duration;

use nodeweave_core::{ConstraintEdge, EdgeId, EntityId, SpatialEntity};

use crate::clock::{Clock, SystemClock};
use crate::{ForceSimulator, LayoutConfig, Result, SchedulerConfig};

/// Current state of the layout loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    /// Not stepping; never started or explicitly stopped.
    Idle,
    /// Stepping once per frame.
    Running,
    /// Stopped on its own after energy stayed low.
    Converged,
}

/// What a call to [`SimulationScheduler::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The loop is not running; nothing was stepped.
    Idle,
    /// One step ran and the loop keeps going.
    Stepped { energy: f64 },
    /// One step ran and the loop went idle afterwards.
    Converged { energy: f64 },
}

/// Drives a [`ForceSimulator`] with kick and auto-stop semantics.
pub struct SimulationScheduler<N: SpatialEntity, C: Clock = SystemClock> {
    simulator: ForceSimulator<N>,
    config: SchedulerConfig,
    clock: C,
    state: LayoutState,
    energy: f64,
    last_kick: Option<Duration>,
    /// Deadline of the pending idle check, cleared by `stop`.
    idle_check_at: Option<Duration>,
    iteration: u64,
}

impl<N: SpatialEntity> SimulationScheduler<N> {
    /// Create a scheduler on the system clock.
    pub fn new(layout: LayoutConfig, config: SchedulerConfig) -> Result<Self> {
        Self::with_clock(layout, config, SystemClock::new())
    }
}

impl<N: SpatialEntity, C: Clock> SimulationScheduler<N, C> {
    /// Create a scheduler on a custom clock.
    pub fn with_clock(layout: LayoutConfig, config: SchedulerConfig, clock: C) -> Result<Self> {
        layout.validate()?;
        config.validate()?;
        Ok(Self {
            simulator: ForceSimulator::new(layout),
            config,
            clock,
            state: LayoutState::Idle,
            energy: 0.0,
            last_kick: None,
            idle_check_at: None,
            iteration: 0,
        })
    }

    // =========================================================================
    // Loop control
    // =========================================================================

    /// Perturb every non-pinned entity and make sure the loop is running.
    pub fn kick(&mut self, intensity: f64) {
        let now = self.clock.now();
        self.last_kick = Some(now);
        self.energy = f64::INFINITY;
        self.simulator.perturb(intensity);
        self.idle_check_at = Some(now + self.config.auto_stop_delay());
        tracing::debug!("layout: kick (intensity {:.2})", intensity);
        if !self.is_running() {
            self.start();
        }
    }

    /// Kick with the configured default intensity.
    pub fn reheat(&mut self) {
        self.kick(self.config.default_kick_intensity);
    }

    /// Begin stepping on every frame.
    pub fn start(&mut self) {
        if self.state != LayoutState::Running {
            self.state = LayoutState::Running;
            tracing::info!("layout: started with {} nodes", self.simulator.node_count());
        }
    }

    /// Halt the loop and drop any pending idle check.
    pub fn stop(&mut self) {
        self.idle_check_at = None;
        if self.state == LayoutState::Running {
            self.state = LayoutState::Idle;
            tracing::info!("layout: stopped after {} iterations", self.iteration);
        }
    }

    /// Per-frame driver.
    pub fn frame(&mut self) -> FrameOutcome {
        if self.state != LayoutState::Running {
            return FrameOutcome::Idle;
        }

        let energy = self.simulator.step();
        self.energy = energy;
        self.iteration += 1;

        // The idle check is due once its deadline has passed; with none pending
        // the layout has been calm since the last kick or stop.
        let now = self.clock.now();
        let idle_check_due = !matches!(self.idle_check_at, Some(at) if now <= at);
        if idle_check_due {
            self.idle_check_at = None;
        }

        if energy < self.config.min_energy_threshold && idle_check_due {
            self.state = LayoutState::Converged;
            self.idle_check_at = None;
            tracing::info!(
                "layout: converged after {} iterations (energy {:.4})",
                self.iteration,
                energy
            );
            return FrameOutcome::Converged { energy };
        }

        FrameOutcome::Stepped { energy }
    }

    /// Run up to `steps` iterations synchronously, outside the frame loop.
    ///
    /// Stops early once energy drops below the threshold. Returns the number
    /// of steps performed.
    pub fn run_once(&mut self, steps: usize) -> usize {
        let mut performed = 0;
        while performed < steps {
            let energy = self.simulator.step();
            self.energy = energy;
            self.iteration += 1;
            performed += 1;
            if energy < self.config.min_energy_threshold {
                break;
            }
        }
        tracing::debug!("layout: settled {} steps (energy {:.4})", performed, self.energy);
        performed
    }

    // =========================================================================
    // Topology (kicks on change)
    // =========================================================================

    /// Register an entity and wake the layout.
    pub fn add_node(&mut self, node: N) -> bool {
        let added = self.simulator.add_node(node);
        if added {
            self.reheat();
        }
        added
    }

    /// Unregister an entity; a running loop stops when fewer than two remain,
    /// otherwise the layout is kicked.
    pub fn remove_node(&mut self, id: EntityId) -> Option<N> {
        let removed = self.simulator.remove_node(id)?;
        if self.simulator.node_count() < 2 && self.is_running() {
            self.stop();
        } else {
            self.reheat();
        }
        Some(removed)
    }

    /// Register an edge and wake the layout.
    pub fn add_edge(&mut self, edge: ConstraintEdge) -> bool {
        let added = self.simulator.add_edge(edge);
        if added {
            self.reheat();
        }
        added
    }

    /// Unregister an edge and wake the layout.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<ConstraintEdge> {
        let removed = self.simulator.remove_edge(id)?;
        self.reheat();
        Some(removed)
    }

    /// Pin an entity (drag/resize start).
    pub fn fix_node(&mut self, id: EntityId) {
        self.simulator.fix_node(id);
    }

    /// Unpin an entity (drag end). Callers usually kick afterwards.
    pub fn release_node(&mut self, id: EntityId) {
        self.simulator.release_node(id);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The driven simulator.
    pub fn simulator(&self) -> &ForceSimulator<N> {
        &self.simulator
    }

    /// Mutable access to the simulator, e.g. for drag position writes.
    pub fn simulator_mut(&mut self) -> &mut ForceSimulator<N> {
        &mut self.simulator
    }

    /// Current loop state.
    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Whether the loop steps on the next frame.
    pub fn is_running(&self) -> bool {
        self.state == LayoutState::Running
    }

    /// Energy of the last step; infinite right after a kick.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Total steps performed.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Deadline of the pending idle check, if any.
    pub fn pending_idle_check(&self) -> Option<Duration> {
        self.idle_check_at
    }

    /// Time of the last kick.
    pub fn last_kick(&self) -> Option<Duration> {
        self.last_kick
    }

    /// Scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
