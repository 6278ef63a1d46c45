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

//! # Damper Infra
//!
//! Concrete implementations of the pipeline's external collaborators: a
//! rapier-backed rigid-body scene with a flat ground, and debug render
//! sinks that log or record what the coordinator forwards.

#![warn(missing_docs)]

pub mod debug;
pub mod physics;

pub use debug::{LogDebugRenderer, RecordingDebugRenderer};
pub use physics::{BodyDesc, RapierScene};
