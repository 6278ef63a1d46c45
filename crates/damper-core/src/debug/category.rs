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
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Subsystem a debug draw command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DebugDrawCategory {
    /// Suspension rays and forces.
    Suspension,
    /// Engine output.
    Engine,
    /// Gearbox state.
    Transmission,
    /// Aerodynamic forces.
    Aero,
    /// Tire contact patches.
    Tires,
    /// Anything else.
    #[default]
    Misc,
}

impl DebugDrawCategory {
    /// Every category, in bit order.
    pub const ALL: [DebugDrawCategory; 6] = [
        DebugDrawCategory::Suspension,
        DebugDrawCategory::Engine,
        DebugDrawCategory::Transmission,
        DebugDrawCategory::Aero,
        DebugDrawCategory::Tires,
        DebugDrawCategory::Misc,
    ];

    /// The bit of this category inside a [`CategoryMask`].
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Lowercase name, as accepted by the parser.
    pub const fn name(self) -> &'static str {
        match self {
            DebugDrawCategory::Suspension => "suspension",
            DebugDrawCategory::Engine => "engine",
            DebugDrawCategory::Transmission => "transmission",
            DebugDrawCategory::Aero => "aero",
            DebugDrawCategory::Tires => "tires",
            DebugDrawCategory::Misc => "misc",
        }
    }
}

impl fmt::Display for DebugDrawCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a category name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown debug draw category '{0}'")]
pub struct CategoryParseError(pub String);

impl FromStr for DebugDrawCategory {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        DebugDrawCategory::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(token))
            .ok_or_else(|| CategoryParseError(token.to_owned()))
    }
}

/// Fixed-size set of enabled [`DebugDrawCategory`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryMask(u32);

impl CategoryMask {
    /// No category enabled.
    pub const NONE: Self = Self(0);
    /// Every category enabled, including ones added later.
    pub const ALL: Self = Self(u32::MAX);

    /// Builds a mask from a comma-separated list such as `"suspension, tires"`.
    ///
    /// Tokens are trimmed and matched case-insensitively. Unknown tokens are
    /// skipped with a warning. A blank list enables every category.
    pub fn from_category_list(list: &str) -> Self {
        if list.trim().is_empty() {
            return Self::ALL;
        }

        let mut mask = Self::NONE;
        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.parse::<DebugDrawCategory>() {
                Ok(category) => mask.insert(category),
                Err(e) => log::warn!("Ignoring debug draw category: {}", e),
            }
        }
        mask
    }

    /// Enables `category`.
    #[inline]
    pub fn insert(&mut self, category: DebugDrawCategory) {
        self.0 |= category.bit();
    }

    /// Whether `category` is enabled.
    #[inline]
    pub const fn contains(self, category: DebugDrawCategory) -> bool {
        self.0 & category.bit() != 0
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl Default for CategoryMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromIterator<DebugDrawCategory> for CategoryMask {
    fn from_iter<I: IntoIterator<Item = DebugDrawCategory>>(iter: I) -> Self {
        let mut mask = Self::NONE;
        for category in iter {
            mask.insert(category);
        }
        mask
    }
}
