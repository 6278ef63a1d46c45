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

//! Runtime configuration, loadable from RON or JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debug::DebugDrawSettings;
use crate::vehicle::SuspensionTuning;

/// Errors raised while loading a [`DamperConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The RON document is malformed.
    #[error("invalid RON configuration: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// The JSON document is malformed.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A value is out of its valid range.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Offending field path.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Settings of the worker context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Solve vehicles one after another instead of fanning out.
    pub force_single_thread: bool,
    /// Multiplier applied to every suspension force before it reaches the
    /// physics scene. Use it to adapt force units to the scene's.
    ///
    /// The default of 1.0 leaves forces untouched. Scenes authored in
    /// centimetres that expect every force multiplied by 100 should set
    /// `100.0`.
    pub force_scale: f32,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            force_single_thread: false,
            force_scale: 1.0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamperConfig {
    /// Default tuning for newly spawned vehicles.
    pub suspension: SuspensionTuning,
    /// Debug draw switches.
    pub debug_draw: DebugDrawSettings,
    /// Worker settings.
    pub worker: WorkerSettings,
}

impl DamperConfig {
    /// Parses and validates a RON document.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tuning = &self.suspension;
        let non_negative = [
            ("suspension.travel", tuning.travel),
            ("suspension.spring_stiffness", tuning.spring_stiffness),
            ("suspension.bump_damping", tuning.bump_damping),
            ("suspension.rebound_damping", tuning.rebound_damping),
            ("suspension.max_force", tuning.max_force),
            ("suspension.wheel_radius", tuning.wheel_radius),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("expected a finite, non-negative number, got {value}"),
                });
            }
        }
        if !self.worker.force_scale.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "worker.force_scale",
                reason: "must be finite".to_owned(),
            });
        }
        Ok(())
    }
}
