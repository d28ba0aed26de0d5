//! 2D vector algebra and axis-aligned rectangle helpers.
//!
//! `Vec2` is an immutable value type: every operation returns a new vector.
//! Normalizing a zero-length vector yields the zero vector rather than NaN,
//! which keeps downstream aim/steering math quiet when an entity is at rest.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// 2D vector with value semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

impl Vec2 {
    pub const ZERO: Vec2 = ZERO;

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn len_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn len(&self) -> f32 {
        self.len_sq().sqrt()
    }

    /// Unit vector in the same direction, or zero when the length is zero.
    pub fn normalized(&self) -> Self {
        let len = self.len();
        if len < 1e-6 {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    /// Same direction, given length. Zero vectors stay zero.
    pub fn with_len(&self, len: f32) -> Self {
        self.normalized() * len
    }

    pub fn scale(&self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    /// `self + other * s`, the integration primitive.
    pub fn add_scaled(&self, other: Vec2, s: f32) -> Self {
        Self::new(self.x + other.x * s, self.y + other.y * s)
    }

    pub fn lerp(&self, target: Vec2, t: f32) -> Self {
        Self::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
        )
    }

    pub fn dist_sq(&self, other: Vec2) -> f32 {
        (*self - other).len_sq()
    }

    pub fn dist(&self, other: Vec2) -> f32 {
        self.dist_sq(other).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        self.scale(rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle in pixel space, min-corner inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            min: Vec2::new(x0.min(x1), y0.min(y1)),
            max: Vec2::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Square box of the given half-extent around a center point.
    pub fn around(center: Vec2, half: f32) -> Self {
        Self::new(
            center.x - half,
            center.y - half,
            center.x + half,
            center.y + half,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}
