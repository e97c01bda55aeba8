// src/engine/queue.rs

use std::collections::VecDeque;

use super::Event;

/// Unbounded FIFO of pending events.
///
/// Not synchronised on its own: the scheduler keeps it behind its queue lock
/// together with the control flags, so an enqueue can never interleave with
/// the worker's emptiness check and dequeue.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Never blocks.
    pub fn put(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Remove and return the oldest event.
    pub fn get(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
