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

use super::DebugDrawCategory;
use crate::math::{LinearRgba, Quaternion, Vec3};

/// Primitive drawn by a [`DebugDrawCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DebugDrawShape {
    /// Segment from `start` to `end`.
    #[default]
    Line,
    /// Segment from `start` to `end` with a cone at `end`.
    Arrow,
    /// Dot at `start`, sized by `radius`.
    Point,
    /// Sphere centered at `start`.
    Sphere,
    /// Oriented box centered at `start` with half-extents `extents`.
    Box,
}

/// A single deferred debug draw request.
///
/// Commands are produced on the worker, carried inside step outputs and
/// handed to a [`DebugRenderSink`](super::DebugRenderSink) by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugDrawCommand {
    /// Primitive kind.
    pub shape: DebugDrawShape,
    /// Subsystem, used for filtering.
    pub category: DebugDrawCategory,
    /// Draw color.
    pub color: LinearRgba,
    /// Lifetime in seconds, 0 for a single frame.
    pub duration: f32,
    /// Line thickness.
    pub thickness: f32,
    /// Whether the primitive is occluded by geometry.
    pub depth_test: bool,
    /// Whether the primitive stays until explicitly cleared.
    pub persistent: bool,
    /// Line/arrow start, or the center/position of other shapes.
    pub start: Vec3,
    /// Line/arrow end.
    pub end: Vec3,
    /// Box orientation.
    pub rotation: Quaternion,
    /// Box half-extents.
    pub extents: Vec3,
    /// Sphere radius or point size.
    pub radius: f32,
    /// Arrow head size.
    pub arrow_size: f32,
}

impl Default for DebugDrawCommand {
    fn default() -> Self {
        Self {
            shape: DebugDrawShape::Line,
            category: DebugDrawCategory::Misc,
            color: LinearRgba::WHITE,
            duration: 0.0,
            thickness: 1.0,
            depth_test: true,
            persistent: false,
            start: Vec3::ZERO,
            end: Vec3::ZERO,
            rotation: Quaternion::IDENTITY,
            extents: Vec3::ZERO,
            radius: 0.0,
            arrow_size: 0.0,
        }
    }
}

impl DebugDrawCommand {
    /// A line segment.
    pub fn line(
        start: Vec3,
        end: Vec3,
        color: LinearRgba,
        thickness: f32,
        category: DebugDrawCategory,
    ) -> Self {
        Self {
            shape: DebugDrawShape::Line,
            category,
            color,
            thickness,
            start,
            end,
            ..Default::default()
        }
    }

    /// An arrow pointing from `start` to `end`.
    pub fn arrow(
        start: Vec3,
        end: Vec3,
        arrow_size: f32,
        color: LinearRgba,
        thickness: f32,
        category: DebugDrawCategory,
    ) -> Self {
        Self {
            shape: DebugDrawShape::Arrow,
            category,
            color,
            thickness,
            start,
            end,
            arrow_size,
            ..Default::default()
        }
    }

    /// A point of the given size.
    pub fn point(position: Vec3, size: f32, color: LinearRgba, category: DebugDrawCategory) -> Self {
        Self {
            shape: DebugDrawShape::Point,
            category,
            color,
            start: position,
            radius: size,
            ..Default::default()
        }
    }

    /// A wire sphere.
    pub fn sphere(center: Vec3, radius: f32, color: LinearRgba, category: DebugDrawCategory) -> Self {
        Self {
            shape: DebugDrawShape::Sphere,
            category,
            color,
            start: center,
            radius,
            ..Default::default()
        }
    }

    /// An oriented wire box.
    pub fn cuboid(
        center: Vec3,
        half_extents: Vec3,
        rotation: Quaternion,
        color: LinearRgba,
        category: DebugDrawCategory,
    ) -> Self {
        Self {
            shape: DebugDrawShape::Box,
            category,
            color,
            start: center,
            extents: half_extents,
            rotation,
            ..Default::default()
        }
    }

    /// Sets the lifetime.
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Returns a copy with duration and thickness multiplied by the given
    /// scales. Thickness never goes below zero.
    pub fn scaled(&self, duration_scale: f32, thickness_scale: f32) -> Self {
        Self {
            duration: self.duration * duration_scale,
            thickness: (self.thickness * thickness_scale).max(0.0),
            ..*self
        }
    }
}
