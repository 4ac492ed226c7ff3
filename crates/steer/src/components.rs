//! # Steering Components
//!
//! Plain data attached to simulation entities. Every component is `Copy`, so
//! passes read a value out of the scene, work on it and write it back.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Placement of an entity in world space.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Transform {
    /// World position.
    pub position: Vec2,
    /// Heading, a unit vector.
    pub rotation: Vec2,
    /// Per-axis scale: `x` across the heading, `y` along it.
    pub scale: Vec2,
}

impl Transform {
    /// Creates a new transform
    #[must_use]
    pub const fn new(position: Vec2, rotation: Vec2, scale: Vec2) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Transform at `position`, heading up the screen, unscaled.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self::new(position, Vec2::new(0.0, -1.0), Vec2::ONE)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

/// Movement state and limits of a steered entity.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Move {
    /// Current velocity in units per second.
    pub velocity: Vec2,
    /// Mass dividing the steering force.
    pub mass: f32,
    /// Upper bound on the velocity's length.
    pub max_speed: f32,
    /// Upper bound on the steering force's length.
    pub max_force: f32,
}

impl Move {
    /// Creates movement state.
    #[must_use]
    pub const fn new(velocity: Vec2, mass: f32, max_speed: f32, max_force: f32) -> Self {
        Self {
            velocity,
            mass,
            max_speed,
            max_force,
        }
    }
}

/// RGBA draw color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Creates a color
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    /// Opaque white
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Opaque red
    pub const RED: Self = Self::rgba(255, 0, 0, 255);
}

macro_rules! shape {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
        pub struct $name {
            /// Half extent of the shape.
            pub radius: f32,
        }

        impl $name {
            /// Creates the shape with the given radius.
            #[must_use]
            pub const fn new(radius: f32) -> Self {
                Self { radius }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new(1.0)
            }
        }
    };
}

shape!(
    /// Agent body drawn as an isosceles triangle pointing along the heading.
    Triangle
);
shape!(
    /// Target marker drawn as a plus sign.
    Crosshair
);
shape!(
    /// Round body. Not drawn by any pass yet.
    Circle
);

/// Marker: steer toward the target at full speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Seek;

/// Steer away from the target while it is within `radius`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flee {
    /// Panic distance.
    pub radius: f32,
}

impl Flee {
    /// Default panic distance.
    pub const DEFAULT_RADIUS: f32 = 100.0;

    /// Creates a flee behavior with the given panic distance.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl Default for Flee {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

/// Steer toward the target and slow down on approach.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arrive {
    /// Larger values brake earlier.
    pub deceleration: f32,
}

impl Arrive {
    /// Default deceleration.
    pub const DEFAULT_DECELERATION: f32 = 2.0;

    /// Scales deceleration into the slow-down distance.
    pub const TWEAK: f32 = 0.3;

    /// Creates an arrive behavior.
    #[must_use]
    pub const fn new(deceleration: f32) -> Self {
        Self { deceleration }
    }
}

impl Default for Arrive {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DECELERATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Flee::default().radius, 100.0);
        assert_eq!(Arrive::default().deceleration, 2.0);
        assert_eq!(Triangle::default().radius, 1.0);
        assert_eq!(Transform::default().rotation, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_color_is_pod() {
        let bytes: [u8; 4] = bytemuck::cast(Color::RED);
        assert_eq!(bytes, [255, 0, 0, 255]);
    }
}
