//! Minimal 3-D math primitives shared by the HAL and the motion controller.
//!
//! The avatar lives in a Y-up, Z-forward frame: yaw is a rotation about the
//! vertical (Y) axis and "forward" is the local +Z direction rotated by the
//! current orientation.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector (sensor reading, position, or direction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Local forward direction (+Z) before any rotation is applied.
    pub fn forward() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn scaled(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `degrees` about the vertical (Y) axis.
    ///
    /// Positive angles turn counter-clockwise when viewed from above, so a
    /// compass heading `h` (clockwise from north) becomes `from_yaw(-h)`.
    pub fn from_yaw(degrees: f32) -> Self {
        let half = degrees.to_radians() * 0.5;
        Self::new(half.cos(), 0.0, half.sin(), 0.0)
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        // Express v as a pure quaternion.
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }

    /// Four-component dot product.  Its magnitude is the cosine of half the
    /// angle between the two rotations.
    pub fn dot(self, rhs: Self) -> f32 {
        self.w * rhs.w + self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Renormalise to unit length.  Returns the identity for a degenerate
    /// (near-zero) quaternion.
    pub fn normalized(self) -> Self {
        let n = self.dot(self).sqrt();
        if n < 1e-6 {
            return Self::identity();
        }
        Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }

    /// Angular distance to `rhs` in radians, in `[0, π]`.
    pub fn angle_to(self, rhs: Self) -> f32 {
        2.0 * self.dot(rhs).abs().clamp(-1.0, 1.0).acos()
    }

    /// Spherical linear interpolation from `self` toward `target`.
    ///
    /// `t` is clamped to `[0, 1]`, so the result never overshoots the
    /// target.  The shorter of the two great-circle arcs is always taken;
    /// near-parallel inputs fall back to normalised linear interpolation to
    /// avoid division by a vanishing `sin`.
    pub fn slerp(self, target: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);

        let mut to = target;
        let mut cos_half = self.dot(target);
        // q and -q encode the same rotation; flip to take the short way round.
        if cos_half < 0.0 {
            to = Self::new(-to.w, -to.x, -to.y, -to.z);
            cos_half = -cos_half;
        }

        if cos_half > 0.9995 {
            // Nearly parallel: nlerp is accurate and avoids sin(ε) division.
            return Self::new(
                self.w + (to.w - self.w) * t,
                self.x + (to.x - self.x) * t,
                self.y + (to.y - self.y) * t,
                self.z + (to.z - self.z) * t,
            )
            .normalized();
        }

        let half_angle = cos_half.clamp(-1.0, 1.0).acos();
        let sin_half = half_angle.sin();
        let wa = ((1.0 - t) * half_angle).sin() / sin_half;
        let wb = (t * half_angle).sin() / sin_half;
        Self::new(
            self.w * wa + to.w * wb,
            self.x * wa + to.x * wb,
            self.y * wa + to.y * wb,
            self.z * wa + to.z * wb,
        )
        .normalized()
    }
}
