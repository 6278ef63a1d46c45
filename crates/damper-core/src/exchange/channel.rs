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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{StepInput, StepOutput};

/// Hand-off point between the coordinator and the worker.
///
/// Inputs go through a single overwrite slot: the worker only ever sees the
/// latest snapshot. Outputs go through an unbounded FIFO queue: the
/// coordinator sees every one of them, oldest first. Neither side blocks on
/// the other.
#[derive(Debug)]
pub struct ExchangeChannel {
    input: Mutex<Option<StepInput>>,
    output_tx: flume::Sender<StepOutput>,
    output_rx: flume::Receiver<StepOutput>,
    closed: AtomicBool,
}

impl ExchangeChannel {
    /// Creates an open channel with an empty input slot.
    pub fn new() -> Self {
        let (output_tx, output_rx) = flume::unbounded();
        log::debug!("Exchange channel initialized.");
        Self {
            input: Mutex::new(None),
            output_tx,
            output_rx,
            closed: AtomicBool::new(false),
        }
    }

    // A panic while holding the slot cannot leave a half-written `Option`.
    fn slot(&self) -> MutexGuard<'_, Option<StepInput>> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrites the input slot.
    ///
    /// The add and remove lists of a replaced input are carried over, in
    /// front of the new ones, so the worker never misses a registry change.
    /// Returns `true` if an input the worker never took was replaced.
    pub fn publish_input(&self, mut input: StepInput) -> bool {
        if self.is_closed() {
            log::trace!("Dropping input #{} on a closed channel.", input.timestamp);
            return false;
        }
        let mut slot = self.slot();
        let replaced = match slot.take() {
            Some(mut stale) => {
                log::trace!("Input #{} superseded by #{}.", stale.timestamp, input.timestamp);
                stale.added.append(&mut input.added);
                stale.removed.append(&mut input.removed);
                input.added = stale.added;
                input.removed = stale.removed;
                true
            }
            None => false,
        };
        *slot = Some(input);
        replaced
    }

    /// Takes the latest input, if one was published since the last take.
    pub fn try_take_input(&self) -> Option<StepInput> {
        if self.is_closed() {
            return None;
        }
        self.slot().take()
    }

    /// Appends an output to the queue.
    pub fn publish_output(&self, output: StepOutput) {
        if self.is_closed() {
            log::trace!("Dropping output #{} on a closed channel.", output.timestamp);
            return;
        }
        if let Err(e) = self.output_tx.send(output) {
            log::error!("Failed to queue step output: {e}.");
        }
    }

    /// Removes and yields every queued output, oldest first.
    pub fn drain_outputs(&self) -> impl Iterator<Item = StepOutput> + '_ {
        self.output_rx.try_iter()
    }

    /// Number of outputs waiting to be drained.
    pub fn pending_outputs(&self) -> usize {
        self.output_rx.len()
    }

    /// Detaches both sides. Any unconsumed input is discarded; queued outputs
    /// can still be drained.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.slot().take();
            log::debug!("Exchange channel closed.");
        }
    }

    /// Whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Default for ExchangeChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleId;
    use std::sync::Arc;
    use std::thread;

    fn input(timestamp: u64) -> StepInput {
        StepInput {
            timestamp,
            ..Default::default()
        }
    }

    fn output(timestamp: u64) -> StepOutput {
        StepOutput {
            timestamp,
            vehicles: Vec::new(),
        }
    }

    #[test]
    fn take_on_empty_slot_returns_none() {
        let channel = ExchangeChannel::new();
        assert!(channel.try_take_input().is_none());
    }

    #[test]
    fn latest_input_wins() {
        let channel = ExchangeChannel::new();
        assert!(!channel.publish_input(input(1)));
        assert!(channel.publish_input(input(2)));

        let taken = channel.try_take_input().expect("an input was published");
        assert_eq!(taken.timestamp, 2);
        assert!(channel.try_take_input().is_none());
    }

    #[test]
    fn superseded_input_keeps_registry_changes() {
        let channel = ExchangeChannel::new();
        let (a, b, c) = (VehicleId::new(), VehicleId::new(), VehicleId::new());
        channel.publish_input(StepInput {
            timestamp: 1,
            added: vec![a, b],
            removed: vec![],
            ..Default::default()
        });
        channel.publish_input(StepInput {
            timestamp: 2,
            added: vec![c],
            removed: vec![b],
            ..Default::default()
        });

        let taken = channel.try_take_input().expect("an input was published");
        assert_eq!(taken.timestamp, 2);
        assert_eq!(taken.added, vec![a, b, c]);
        assert_eq!(taken.removed, vec![b]);
    }

    #[test]
    fn outputs_drain_in_fifo_order() {
        let channel = ExchangeChannel::new();
        for ts in [1, 2, 3] {
            channel.publish_output(output(ts));
        }
        assert_eq!(channel.pending_outputs(), 3);

        let drained: Vec<u64> = channel.drain_outputs().map(|o| o.timestamp).collect();
        assert_eq!(drained, vec![1, 2, 3]);
        assert_eq!(channel.pending_outputs(), 0);
    }

    #[test]
    fn closed_channel_detaches_both_sides() {
        let channel = ExchangeChannel::new();
        channel.publish_input(input(1));
        channel.publish_output(output(1));
        channel.close();
        channel.close();

        assert!(channel.is_closed());
        assert!(channel.try_take_input().is_none());
        assert!(!channel.publish_input(input(2)));
        channel.publish_output(output(2));

        // Outputs queued before closing are still delivered.
        let drained: Vec<u64> = channel.drain_outputs().map(|o| o.timestamp).collect();
        assert_eq!(drained, vec![1]);
    }

    #[test]
    fn outputs_cross_threads() {
        let channel = Arc::new(ExchangeChannel::new());
        let worker_side = Arc::clone(&channel);

        let handle = thread::spawn(move || {
            for ts in 0..10 {
                worker_side.publish_output(output(ts));
            }
        });
        handle.join().expect("worker thread panicked");

        let drained: Vec<u64> = channel.drain_outputs().map(|o| o.timestamp).collect();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
    }
}
