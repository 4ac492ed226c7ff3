//! # Simulation Driver
//!
//! One call to [`Simulation::step`] runs a full frame:
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────────────┐
//! │ 1. CLAMP DELTA    dt into [0, max_delta_time]        │
//! │ 2. UPDATE         crosshair → wraparound             │
//! │ 3. BEHAVIORS      seek → flee → arrive               │
//! │ 4. STATS          FrameStats returned to the caller  │
//! └──────────────────────────────────────────────────────┘
//! ```
//! Drawing is separate and read-only: [`Simulation::draw`] can run any
//! number of times between steps.
//!
//! The driver owns no clock, window or input; the caller supplies the
//! target point and elapsed time each frame.

use steer_core::{EntityId, Scene};

use crate::behavior;
use crate::components::{Arrive, Color, Crosshair, Flee, Move, Seek, Transform, Triangle};
use crate::config::{AgentConfig, BehaviorConfig, CrosshairConfig, SimulationConfig};
use crate::draw::{self, DrawList};
use crate::error::SteerResult;
use crate::math::Vec2;
use crate::update;

/// Per-frame counters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Delta time actually simulated, after clamping.
    pub delta_time: f32,
    /// Entities integrated by the behavior passes.
    pub steered: usize,
    /// Entities wrapped around the world edges.
    pub wrapped: usize,
}

/// A steering scene plus the passes that advance it.
pub struct Simulation {
    scene: Scene,
    config: SimulationConfig,
    crosshair: Option<EntityId>,
    agents: Vec<EntityId>,
    frame_count: u64,
}

impl Simulation {
    /// Builds the scene described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SteerError::InvalidConfig`] if the config does not
    /// validate, or a scene error if spawning fails.
    pub fn new(config: SimulationConfig) -> SteerResult<Self> {
        config.validate()?;

        let mut simulation = Self {
            scene: Scene::new(config.max_entities),
            crosshair: None,
            agents: Vec::with_capacity(config.agents.len()),
            frame_count: 0,
            config,
        };
        simulation.populate()?;

        tracing::debug!(
            agents = simulation.agents.len(),
            capacity = simulation.config.max_entities,
            "simulation ready"
        );
        Ok(simulation)
    }

    fn populate(&mut self) -> SteerResult<()> {
        if self.config.crosshair.enabled {
            let marker = self.config.crosshair;
            self.crosshair = Some(self.spawn_crosshair(&marker)?);
        }
        for agent in self.config.agents.clone() {
            self.spawn_agent(&agent)?;
        }
        Ok(())
    }

    /// Spawns the target marker.
    fn spawn_crosshair(&mut self, marker: &CrosshairConfig) -> SteerResult<EntityId> {
        let id = self.scene.new_entity()?;
        self.scene.add_component(id, Crosshair::new(marker.radius))?;
        self.scene.add_component(
            id,
            Transform::new(marker.position, Vec2::new(0.0, -1.0), Vec2::ONE),
        )?;
        self.scene.add_component(id, marker.color)?;
        Ok(id)
    }

    /// Spawns one steered agent.
    ///
    /// # Errors
    ///
    /// Returns a scene error if the scene is full.
    pub fn spawn_agent(&mut self, agent: &AgentConfig) -> SteerResult<EntityId> {
        let id = self.scene.new_entity()?;
        let heading = agent.heading.try_normalize().unwrap_or(Vec2::new(0.0, -1.0));

        match agent.behavior {
            BehaviorConfig::Seek => {
                self.scene.add_component(id, Seek)?;
            }
            BehaviorConfig::Flee { radius } => {
                self.scene.add_component(id, Flee::new(radius))?;
            }
            BehaviorConfig::Arrive { deceleration } => {
                self.scene.add_component(id, Arrive::new(deceleration))?;
            }
        }
        self.scene.add_component(id, Triangle::new(agent.radius))?;
        self.scene
            .add_component(id, Transform::new(agent.position, heading, agent.scale))?;
        self.scene.add_component(
            id,
            Move::new(agent.velocity, agent.mass, agent.max_speed, agent.max_force),
        )?;
        self.scene.add_component(id, agent.color)?;

        self.agents.push(id);
        tracing::trace!(entity = %id, behavior = ?agent.behavior, "spawned agent");
        Ok(id)
    }

    /// Advances the simulation by one frame toward `target`.
    ///
    /// `delta_time` is clamped to `[0, max_delta_time]`; a NaN delta
    /// simulates nothing.
    pub fn step(&mut self, target: Vec2, delta_time: f32) -> FrameStats {
        let dt = if delta_time.is_nan() {
            0.0
        } else {
            delta_time.clamp(0.0, self.config.max_delta_time)
        };

        update::crosshair(target, &mut self.scene);
        let wrapped = update::wraparound(self.config.world.width, self.config.world.height, &mut self.scene);

        let steered = behavior::seek(target, &mut self.scene, dt)
            + behavior::flee(target, &mut self.scene, dt)
            + behavior::arrive(target, &mut self.scene, dt);

        let stats = FrameStats {
            frame: self.frame_count,
            delta_time: dt,
            steered,
            wrapped,
        };
        self.frame_count += 1;

        tracing::debug!(
            frame = stats.frame,
            dt = stats.delta_time,
            steered,
            wrapped,
            "frame complete"
        );
        stats
    }

    /// Renders the current frame into a fresh draw list.
    #[must_use]
    pub fn draw(&self) -> DrawList {
        let mut list = DrawList::new(Color::WHITE);
        self.draw_into(&mut list);
        list
    }

    /// Renders the current frame into `list`, replacing its contents.
    pub fn draw_into(&self, list: &mut DrawList) {
        list.clear();
        list.background = Color::WHITE;
        draw::crosshairs(&self.scene, list);
        draw::triangles(&self.scene, list);
    }

    /// Removes every entity, dropping all components.
    pub fn despawn_all(&mut self) {
        let removed = self.scene.alive_count();
        self.scene.clear();
        self.agents.clear();
        self.crosshair = None;
        tracing::debug!(removed, "despawned all entities");
    }

    /// Returns the scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns the scene for direct edits between frames.
    #[must_use]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Returns the configuration the simulation was built from.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the ids of the spawned agents, in spawn order.
    #[must_use]
    pub fn agents(&self) -> &[EntityId] {
        &self.agents
    }

    /// Returns the crosshair entity, if one was spawned.
    #[must_use]
    pub fn crosshair(&self) -> Option<EntityId> {
        self.crosshair
    }

    /// Number of frames stepped so far.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("scene", &self.scene)
            .field("agents", &self.agents.len())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        assert_eq!(sim.scene().alive_count(), 2);
        assert_eq!(sim.agents().len(), 1);

        let agent = sim.agents()[0];
        let scene = sim.scene();
        assert!(scene.has_component::<Arrive>(agent));
        assert!(scene.has_component::<Triangle>(agent));
        assert_eq!(
            scene.get_component::<Transform>(agent).unwrap().position,
            Vec2::new(125.0, 125.0)
        );
        assert_eq!(scene.get_component::<Color>(agent), Ok(&Color::RED));

        let marker = sim.crosshair().unwrap();
        assert!(scene.has_component::<Crosshair>(marker));
        assert!(!scene.has_component::<Move>(marker));
    }

    #[test]
    fn test_delta_time_is_clamped() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let target = Vec2::new(250.0, 250.0);

        assert_eq!(sim.step(target, 1.0).delta_time, 0.05);
        assert_eq!(sim.step(target, -1.0).delta_time, 0.0);
        assert_eq!(sim.step(target, f32::NAN).delta_time, 0.0);
        assert_eq!(sim.step(target, 0.016).delta_time, 0.016);
        assert_eq!(sim.frame_count(), 4);
    }

    #[test]
    fn test_step_moves_crosshair_and_agent() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let target = Vec2::new(400.0, 125.0);

        let stats = sim.step(target, 0.05);
        assert_eq!(stats.frame, 0);
        assert_eq!(stats.steered, 1);

        let marker = sim.crosshair().unwrap();
        assert_eq!(
            sim.scene().get_component::<Transform>(marker).unwrap().position,
            target
        );
        let agent = sim.agents()[0];
        assert!(sim.scene().get_component::<Move>(agent).unwrap().velocity.x > 0.0);
    }

    #[test]
    fn test_draw_and_despawn() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let list = sim.draw();
        assert_eq!(list.len(), 2 + 3);
        assert_eq!(list.background, Color::WHITE);

        let agent = sim.agents()[0];
        sim.despawn_all();
        assert_eq!(sim.scene().alive_count(), 0);
        assert!(!sim.scene().is_alive(agent));
        assert!(sim.draw().is_empty());
        assert_eq!(sim.step(Vec2::ZERO, 0.05).steered, 0);
    }
}
