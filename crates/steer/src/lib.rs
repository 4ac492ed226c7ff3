//! # STEER Simulation
//!
//! Classic steering behaviors (seek, flee, arrive) for triangle agents
//! chasing a crosshair, built on the `steer_core` entity runtime.
//!
//! ## Frame Structure
//!
//! 1. **Update** - Move the crosshair to the target, wrap agents at the edges
//! 2. **Behave** - Each behavior pass steers the entities carrying its marker
//! 3. **Draw** - Read-only passes emit colored line segments
//!
//! ## Example
//!
//! ```rust
//! use steer::{Simulation, SimulationConfig, Vec2};
//!
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! for _ in 0..60 {
//!     sim.step(Vec2::new(250.0, 250.0), 1.0 / 60.0);
//! }
//! let frame = sim.draw();
//! assert!(!frame.is_empty());
//! # Ok::<(), steer::SteerError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod behavior;
pub mod components;
pub mod config;
pub mod draw;
pub mod error;
pub mod math;
pub mod simulation;
pub mod update;

pub use components::{Arrive, Circle, Color, Crosshair, Flee, Move, Seek, Transform, Triangle};
pub use config::{AgentConfig, BehaviorConfig, CrosshairConfig, SimulationConfig, WorldConfig};
pub use draw::{DrawList, Line};
pub use error::{SteerError, SteerResult};
pub use math::Vec2;
pub use simulation::{FrameStats, Simulation};
