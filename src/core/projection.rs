//! Hand-rolled 3D math for the landscape view.
//!
//! The same `project` call drives forward rendering and click hit-testing, so
//! anything drawn at a pixel can be picked at that pixel.

use core::ops::{Add, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

/// View rotation in radians: `x` tilts about the X axis, `y` turns about the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

impl Rotation {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotate about X first, then about Y. The order is fixed.
    pub fn apply(self, p: Vec3) -> Vec3 {
        let (sx, cx) = self.x.sin_cos();
        let y1 = p.y * cx - p.z * sx;
        let z1 = p.y * sx + p.z * cx;

        let (sy, cy) = self.y.sin_cos();
        let x2 = p.x * cy + z1 * sy;
        let z2 = -p.x * sy + z1 * cy;

        Vec3::new(x2, y1, z2)
    }
}

/// Screen-space placement of the world origin plus the focal distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center_x: f32,
    pub center_y: f32,
    pub focal_distance: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, focal_distance: f32) -> Self {
        Self {
            center_x: width * 0.5,
            center_y: height * 0.5,
            focal_distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    /// Rotated z. `<= 0` is behind the viewer and never drawn.
    pub depth: f32,
    pub scale: f32,
}

impl Projected {
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.depth > 0.0 && self.scale.is_finite()
    }

    #[inline]
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub fn project(point: Vec3, rotation: Rotation, view: &Viewport) -> Projected {
    let r = rotation.apply(point);
    let d = view.focal_distance;
    let scale = d / (d + r.z);
    Projected {
        x: view.center_x + r.x * scale,
        y: view.center_y + r.y * scale,
        depth: r.z,
        scale,
    }
}
