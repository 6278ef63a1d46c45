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
use std::ops::{Index, IndexMut};

/// One of the four suspension corners of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelPosition {
    /// Front left corner.
    FrontLeft,
    /// Front right corner.
    FrontRight,
    /// Rear left corner.
    RearLeft,
    /// Rear right corner.
    RearRight,
}

impl WheelPosition {
    /// All positions, in solve order.
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    /// Position of this wheel inside a [`PerWheel`] array.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            WheelPosition::FrontLeft => 0,
            WheelPosition::FrontRight => 1,
            WheelPosition::RearLeft => 2,
            WheelPosition::RearRight => 3,
        }
    }
}

impl fmt::Display for WheelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelPosition::FrontLeft => write!(f, "FrontLeft"),
            WheelPosition::FrontRight => write!(f, "FrontRight"),
            WheelPosition::RearLeft => write!(f, "RearLeft"),
            WheelPosition::RearRight => write!(f, "RearRight"),
        }
    }
}

/// One value per wheel, indexed by [`WheelPosition`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerWheel<T>(pub [T; 4]);

impl<T> PerWheel<T> {
    /// Builds a set by calling `f` for every position.
    pub fn from_fn(mut f: impl FnMut(WheelPosition) -> T) -> Self {
        Self(WheelPosition::ALL.map(&mut f))
    }

    /// Iterates `(position, value)` pairs in solve order.
    pub fn iter(&self) -> impl Iterator<Item = (WheelPosition, &T)> {
        WheelPosition::ALL.into_iter().zip(self.0.iter())
    }

    /// Maps every value, keeping positions.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerWheel<U> {
        PerWheel::from_fn(|pos| f(&self[pos]))
    }
}

impl<T: Clone> PerWheel<T> {
    /// Uses the same value for all four wheels.
    pub fn splat(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T> Index<WheelPosition> for PerWheel<T> {
    type Output = T;
    #[inline]
    fn index(&self, pos: WheelPosition) -> &T {
        &self.0[pos.index()]
    }
}

impl<T> IndexMut<WheelPosition> for PerWheel<T> {
    #[inline]
    fn index_mut(&mut self, pos: WheelPosition) -> &mut T {
        &mut self.0[pos.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexing_matches_position_order() {
        let mut wheels = PerWheel::from_fn(|pos| pos.index() * 10);
        assert_eq!(wheels[WheelPosition::RearLeft], 20);
        wheels[WheelPosition::FrontRight] = 7;
        assert_eq!(wheels.0, [0, 7, 20, 30]);
    }

    #[test]
    fn iter_pairs_positions_with_values() {
        let wheels = PerWheel::splat('x').map(|c| c.to_ascii_uppercase());
        let positions: Vec<_> = wheels.iter().map(|(pos, _)| pos).collect();
        assert_eq!(positions, WheelPosition::ALL.to_vec());
        assert!(wheels.iter().all(|(_, c)| *c == 'X'));
    }
}
