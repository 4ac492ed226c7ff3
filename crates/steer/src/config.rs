//! # Simulation Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, and an empty
//! file yields the stock scene: one arriving agent chasing a crosshair.
//!
//! ```toml
//! max_entities = 1024
//! max_delta_time = 0.05
//!
//! [world]
//! width = 800.0
//! height = 600.0
//!
//! [crosshair]
//! radius = 5.0
//!
//! [[agents]]
//! behavior = { kind = "flee", radius = 120.0 }
//! position = { x = 100.0, y = 100.0 }
//! color = { r = 0, g = 0, b = 255, a = 255 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use steer_core::DEFAULT_MAX_ENTITIES;

use crate::components::{Arrive, Color, Flee};
use crate::error::{SteerError, SteerResult};
use crate::math::Vec2;

/// Top-level simulation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Capacity of the scene.
    pub max_entities: usize,
    /// Upper clamp for a frame's delta time, in seconds.
    pub max_delta_time: f32,
    /// World bounds used for wraparound.
    pub world: WorldConfig,
    /// Target marker.
    pub crosshair: CrosshairConfig,
    /// Steered agents spawned at startup.
    pub agents: Vec<AgentConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            max_delta_time: 0.05,
            world: WorldConfig::default(),
            crosshair: CrosshairConfig::default(),
            agents: vec![AgentConfig::default()],
        }
    }
}

/// World bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width in world units.
    pub width: f32,
    /// Height in world units.
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
        }
    }
}

/// Target marker settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosshairConfig {
    /// Spawn the marker at all.
    pub enabled: bool,
    /// Stroke half length.
    pub radius: f32,
    /// Initial position, before the first target arrives.
    pub position: Vec2,
    /// Stroke color.
    pub color: Color,
}

impl Default for CrosshairConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 5.0,
            position: Vec2::new(250.0, 250.0),
            color: Color::BLACK,
        }
    }
}

/// Steering behavior of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorConfig {
    /// Head for the target at full speed.
    Seek,
    /// Run from the target while it is within `radius`.
    Flee {
        /// Panic distance.
        #[serde(default = "default_flee_radius")]
        radius: f32,
    },
    /// Head for the target and brake on approach.
    Arrive {
        /// Larger values brake earlier.
        #[serde(default = "default_deceleration")]
        deceleration: f32,
    },
}

fn default_flee_radius() -> f32 {
    Flee::DEFAULT_RADIUS
}

fn default_deceleration() -> f32 {
    Arrive::DEFAULT_DECELERATION
}

/// One steered agent, drawn as a triangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Steering behavior.
    pub behavior: BehaviorConfig,
    /// Spawn position.
    pub position: Vec2,
    /// Initial heading, normalized on spawn.
    pub heading: Vec2,
    /// Triangle scale: `x` across, `y` along the heading.
    pub scale: Vec2,
    /// Triangle radius.
    pub radius: f32,
    /// Initial velocity.
    pub velocity: Vec2,
    /// Mass dividing the steering force.
    pub mass: f32,
    /// Speed limit.
    pub max_speed: f32,
    /// Steering force limit.
    pub max_force: f32,
    /// Body color.
    pub color: Color,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            behavior: BehaviorConfig::Arrive {
                deceleration: Arrive::DEFAULT_DECELERATION,
            },
            position: Vec2::new(125.0, 125.0),
            heading: Vec2::new(0.0, -1.0),
            scale: Vec2::new(0.75, 1.0),
            radius: 15.0,
            velocity: Vec2::ZERO,
            mass: 1.0,
            max_speed: 150.0,
            max_force: 85.0,
            color: Color::RED,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SteerError::Parse`] for malformed TOML and
    /// [`SteerError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> SteerResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SteerError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`SimulationConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> SteerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SteerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            agents = config.agents.len(),
            "loaded simulation config"
        );
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SteerError::Serialize`] if a value has no TOML form.
    pub fn to_toml_string(&self) -> SteerResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Number of entities the configured scene spawns.
    #[must_use]
    pub fn population(&self) -> usize {
        self.agents.len() + usize::from(self.crosshair.enabled)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SteerError::InvalidConfig`] naming the first offending value.
    pub fn validate(&self) -> SteerResult<()> {
        if self.max_entities == 0 || u32::try_from(self.max_entities).is_err() {
            return invalid(format!(
                "max_entities must be between 1 and {}, got {}",
                u32::MAX,
                self.max_entities
            ));
        }
        if self.population() > self.max_entities {
            return invalid(format!(
                "{} entities configured but max_entities is {}",
                self.population(),
                self.max_entities
            ));
        }
        if !(self.max_delta_time.is_finite() && self.max_delta_time >= 0.0) {
            return invalid(format!(
                "max_delta_time must be a non-negative number, got {}",
                self.max_delta_time
            ));
        }
        positive("world.width", self.world.width)?;
        positive("world.height", self.world.height)?;
        non_negative("crosshair.radius", self.crosshair.radius)?;

        for (index, agent) in self.agents.iter().enumerate() {
            agent
                .validate()
                .map_err(|reason| SteerError::InvalidConfig(format!("agents[{index}]: {reason}")))?;
        }
        Ok(())
    }
}

impl AgentConfig {
    fn validate(&self) -> Result<(), String> {
        let check = |name: &str, value: f32, strict: bool| {
            let ok = value.is_finite() && if strict { value > 0.0 } else { value >= 0.0 };
            if ok {
                Ok(())
            } else {
                Err(format!("{name} must be {}, got {value}", if strict { "positive" } else { "non-negative" }))
            }
        };

        check("mass", self.mass, true)?;
        check("max_speed", self.max_speed, false)?;
        check("max_force", self.max_force, false)?;
        check("radius", self.radius, false)?;
        match self.behavior {
            BehaviorConfig::Seek => {}
            BehaviorConfig::Flee { radius } => check("behavior.radius", radius, false)?,
            BehaviorConfig::Arrive { deceleration } => {
                check("behavior.deceleration", deceleration, true)?;
            }
        }
        Ok(())
    }
}

fn invalid(reason: String) -> SteerResult<()> {
    Err(SteerError::InvalidConfig(reason))
}

fn positive(name: &str, value: f32) -> SteerResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be positive, got {value}"))
    }
}

fn non_negative(name: &str, value: f32) -> SteerResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be non-negative, got {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_stock_scene() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.population(), 2);
        assert_eq!(
            config.agents[0].behavior,
            BehaviorConfig::Arrive { deceleration: 2.0 }
        );
    }

    #[test]
    fn test_parse_agents() {
        let config = SimulationConfig::from_toml_str(
            r#"
            max_entities = 16

            [world]
            width = 800.0

            [crosshair]
            enabled = false

            [[agents]]
            behavior = { kind = "seek" }
            max_speed = 10.0

            [[agents]]
            behavior = { kind = "flee" }
            position = { x = 1.0, y = 2.0 }
            color = { r = 0, g = 0, b = 255, a = 255 }
            "#,
        )
        .unwrap();

        assert_eq!(config.max_entities, 16);
        assert_eq!(config.world.width, 800.0);
        assert_eq!(config.world.height, 500.0);
        assert!(!config.crosshair.enabled);
        assert_eq!(config.agents.len(), 2);
        assert_eq!(config.agents[0].behavior, BehaviorConfig::Seek);
        assert_eq!(config.agents[0].max_speed, 10.0);
        assert_eq!(config.agents[0].mass, 1.0);
        assert_eq!(config.agents[1].behavior, BehaviorConfig::Flee { radius: 100.0 });
        assert_eq!(config.agents[1].position, Vec2::new(1.0, 2.0));
        assert_eq!(config.agents[1].color, Color::rgba(0, 0, 255, 255));
    }

    #[test]
    fn test_rejects_bad_values() {
        let zero_mass = "[[agents]]\nmass = 0.0\n";
        assert!(matches!(
            SimulationConfig::from_toml_str(zero_mass),
            Err(SteerError::InvalidConfig(reason)) if reason.contains("agents[0]")
        ));

        let crowded = "max_entities = 1\n";
        assert!(matches!(
            SimulationConfig::from_toml_str(crowded),
            Err(SteerError::InvalidConfig(_))
        ));

        let flat = "[world]\nheight = 0.0\n";
        assert!(matches!(
            SimulationConfig::from_toml_str(flat),
            Err(SteerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            SimulationConfig::from_toml_str("max_entities = \"many\""),
            Err(SteerError::Parse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[[agents]]\nbehavior = { kind = \"wander\" }"),
            Err(SteerError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let text = SimulationConfig::default().to_toml_string().unwrap();
        assert_eq!(
            SimulationConfig::from_toml_str(&text).unwrap(),
            SimulationConfig::default()
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = SimulationConfig::load("/nonexistent/steer.toml");
        assert!(matches!(result, Err(SteerError::Io { .. })));
    }
}
