// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rigid transforms (rotation + translation) for bodies and attach points.

use crate::math::{Quaternion, Vec3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A rigid transformation: a rotation followed by a translation.
///
/// Composition follows the usual matrix convention: `parent * local` maps a
/// point from `local` space through `parent` into the parent's space, so a
/// wheel attach point in world space is `chassis_world * attach_local`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Orientation of the frame.
    pub rotation: Quaternion,
    /// Origin of the frame.
    pub translation: Vec3,
}

impl RigidTransform {
    /// The identity transform, which results in no change.
    pub const IDENTITY: Self = Self {
        rotation: Quaternion::IDENTITY,
        translation: Vec3::ZERO,
    };

    /// Creates a transform from a translation and a rotation.
    #[inline]
    pub fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Creates a pure translation.
    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quaternion::IDENTITY)
    }

    /// Creates a pure rotation.
    #[inline]
    pub fn from_rotation(rotation: Quaternion) -> Self {
        Self::new(Vec3::ZERO, rotation)
    }

    /// Maps a point from local space into this transform's parent space.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Rotates a direction from local space into this transform's parent space.
    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// The frame's local +Y axis expressed in parent space.
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.transform_vector(Vec3::Y)
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.conjugate();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for RigidTransform {
    type Output = Self;
    /// `self * rhs` applies `rhs` first, then `self`.
    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            rotation: self.rotation * rhs.rotation,
            translation: self.transform_point(rhs.translation),
        }
    }
}
