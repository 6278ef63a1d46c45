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

use serde::{Deserialize, Serialize};

use super::{CategoryMask, DebugDrawCommand};

/// User-facing debug draw switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugDrawSettings {
    /// Master switch.
    pub enabled: bool,
    /// Comma-separated category list. Blank means every category.
    pub categories: String,
    /// Multiplier applied to every command's duration.
    pub duration_scale: f32,
    /// Multiplier applied to every command's thickness.
    pub thickness_scale: f32,
}

impl Default for DebugDrawSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            categories: String::new(),
            duration_scale: 1.0,
            thickness_scale: 1.0,
        }
    }
}

impl DebugDrawSettings {
    /// Parses the category list once into a reusable filter.
    pub fn filter(&self) -> DebugDrawFilter {
        DebugDrawFilter {
            enabled: self.enabled,
            mask: CategoryMask::from_category_list(&self.categories),
            duration_scale: self.duration_scale,
            thickness_scale: self.thickness_scale,
        }
    }

    /// Commands a sink should draw: enabled categories only, scaled.
    ///
    /// Re-parses the category list on every call; hold a [`DebugDrawFilter`]
    /// when filtering repeatedly.
    pub fn filter_and_scale(&self, commands: &[DebugDrawCommand]) -> Vec<DebugDrawCommand> {
        self.filter().apply(commands)
    }
}

/// [`DebugDrawSettings`] with the category list already parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugDrawFilter {
    /// Master switch.
    pub enabled: bool,
    /// Enabled categories.
    pub mask: CategoryMask,
    /// Duration multiplier.
    pub duration_scale: f32,
    /// Thickness multiplier.
    pub thickness_scale: f32,
}

impl Default for DebugDrawFilter {
    fn default() -> Self {
        DebugDrawSettings::default().filter()
    }
}

impl DebugDrawFilter {
    /// Filters by category and scales. Returns nothing when disabled.
    pub fn apply(&self, commands: &[DebugDrawCommand]) -> Vec<DebugDrawCommand> {
        if !self.enabled {
            return Vec::new();
        }
        commands
            .iter()
            .filter(|cmd| self.mask.contains(cmd.category))
            .map(|cmd| cmd.scaled(self.duration_scale, self.thickness_scale))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugDrawCategory;
    use crate::math::{LinearRgba, Vec3};

    fn line(category: DebugDrawCategory) -> DebugDrawCommand {
        DebugDrawCommand::line(Vec3::ZERO, Vec3::Y, LinearRgba::MAGENTA, 2.0, category).with_duration(1.0)
    }

    #[test]
    fn filters_by_category_and_scales() {
        let settings = DebugDrawSettings {
            categories: "suspension".into(),
            duration_scale: 3.0,
            thickness_scale: 0.5,
            ..Default::default()
        };
        let drawn = settings.filter_and_scale(&[
            line(DebugDrawCategory::Suspension),
            line(DebugDrawCategory::Engine),
        ]);
        assert_eq!(drawn.len(), 1);
        assert_eq!(drawn[0].category, DebugDrawCategory::Suspension);
        assert_eq!(drawn[0].duration, 3.0);
        assert_eq!(drawn[0].thickness, 1.0);
    }

    #[test]
    fn disabled_settings_draw_nothing() {
        let settings = DebugDrawSettings {
            enabled: false,
            ..Default::default()
        };
        assert!(settings.filter_and_scale(&[line(DebugDrawCategory::Misc)]).is_empty());
    }

    #[test]
    fn deserializes_with_defaults() {
        let settings: DebugDrawSettings =
            ron::from_str("(categories: \"tires, aero\")").expect("valid settings");
        assert!(settings.enabled);
        assert_eq!(settings.duration_scale, 1.0);
        assert!(settings.filter().mask.contains(DebugDrawCategory::Aero));
    }
}
