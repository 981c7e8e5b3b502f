// ABOUTME: Single-consumer event loop: drains the queue one event at a time through the machine.
// ABOUTME: Each event is fully processed, commands dispatched in order, before the next is dequeued.

use tokio::sync::mpsc;

use crate::catalog::Catalog;
use crate::dispatch::{self, Effects};
use crate::machine::Machine;
use crate::state::Event;

/// Sending half of the event queue. Effect handlers and the event source
/// hold clones; sends enqueue without ever re-entering the machine.
pub type EventSender = mpsc::UnboundedSender<Event>;

/// Owns the machine, the receiving half of the queue, and the effects.
pub struct Runtime<C> {
    machine: Machine,
    events: mpsc::UnboundedReceiver<Event>,
    emit: EventSender,
    effects: Effects<C>,
}

impl<C: Catalog> Runtime<C> {
    pub fn new(
        machine: Machine,
        effects: Effects<C>,
        emit: EventSender,
        events: mpsc::UnboundedReceiver<Event>,
    ) -> Self {
        Self {
            machine,
            events,
            emit,
            effects,
        }
    }

    /// Drain the queue until every sender is gone. One event at a time: the
    /// machine steps, then its commands dispatch in order, then the next
    /// event is dequeued.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            for command in self.machine.process_event(&event) {
                dispatch::execute(command, &self.emit, &self.effects);
            }
        }
        tracing::info!("Event queue closed, stopping");
    }
}
