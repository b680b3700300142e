//! Bounded per-channel frame ring
//!
//! A fixed number of frame slots shared by one producer and any number of
//! consumers. Two semaphores count free slots and ready frames; their sum
//! is always the capacity once no push or pop is in flight. The cursors
//! themselves only move while the ring mutex is held.
//!
//! ```text
//!            free_slots                 ready_frames
//!   push ──► acquire ──► lock ──► write ──► unlock ──► add_permits
//!   pop  ──► acquire(ready) ──► lock ──► read ──► unlock ──► add_permits(free)
//! ```
//!
//! Consumers share one read cursor, so two clients on the same channel
//! take turns: each frame is delivered to exactly one of them.

use bytes::Bytes;
use tokio::sync::{Mutex, Semaphore};

use super::frame::{truncate_line, Frame};

/// Fixed storage for the frames of one channel
#[derive(Debug)]
struct Ring {
    /// `capacity` slots, each with exactly `max_frame_lines` lines;
    /// unused lines are empty
    slots: Vec<Vec<Bytes>>,
    write_pos: usize,
    read_pos: usize,
    len: usize,
}

impl Ring {
    fn new(capacity: usize, max_frame_lines: usize) -> Self {
        Self {
            slots: vec![vec![Bytes::new(); max_frame_lines]; capacity],
            write_pos: 0,
            read_pos: 0,
            len: 0,
        }
    }

    fn write(&mut self, frame: &Frame, max_line_len: usize) {
        debug_assert!(self.len < self.slots.len(), "write into a full ring");
        let slot = &mut self.slots[self.write_pos];
        let mut lines = frame.lines().iter();

        // Every line of the slot is overwritten so a short frame cannot
        // expose the tail of a longer one stored here before
        for stored in slot.iter_mut() {
            *stored = match lines.next() {
                Some(line) => truncate_line(line, max_line_len),
                None => Bytes::new(),
            };
        }

        self.write_pos = (self.write_pos + 1) % self.slots.len();
        self.len += 1;
    }

    fn read(&mut self) -> Frame {
        debug_assert!(self.len > 0, "read from an empty ring");
        let slot = &self.slots[self.read_pos];
        let frame = Frame::from_lines(
            slot.iter()
                .take_while(|line| !line.is_empty())
                .cloned(),
        );

        self.read_pos = (self.read_pos + 1) % self.slots.len();
        self.len -= 1;
        frame
    }
}

/// Bounded blocking frame queue for one channel
#[derive(Debug)]
pub struct ChannelBuffer {
    ring: Mutex<Ring>,
    free_slots: Semaphore,
    ready_frames: Semaphore,
    capacity: usize,
    max_line_len: usize,
}

impl ChannelBuffer {
    /// Create a buffer with `capacity` slots of `max_frame_lines` lines each
    pub fn new(capacity: usize, max_frame_lines: usize, max_line_len: usize) -> Self {
        Self {
            ring: Mutex::new(Ring::new(capacity, max_frame_lines)),
            free_slots: Semaphore::new(capacity),
            ready_frames: Semaphore::new(0),
            capacity,
            max_line_len,
        }
    }

    /// Store a frame, waiting while the buffer is full
    ///
    /// Lines past the line limit are dropped and lines longer than the
    /// length limit are truncated, keeping their `\n`. Dropping the returned
    /// future before it completes leaves the buffer unchanged.
    pub async fn push(&self, frame: &Frame) {
        let permit = match self.free_slots.acquire().await {
            Ok(permit) => permit,
            // Neither semaphore is ever closed
            Err(_) => return std::future::pending().await,
        };

        let mut ring = self.ring.lock().await;
        ring.write(frame, self.max_line_len);
        drop(ring);

        permit.forget();
        self.ready_frames.add_permits(1);
    }

    /// Take the oldest frame, waiting while the buffer is empty
    ///
    /// Dropping the returned future before it completes consumes nothing.
    pub async fn pop(&self) -> Frame {
        let permit = match self.ready_frames.acquire().await {
            Ok(permit) => permit,
            Err(_) => return std::future::pending().await,
        };

        let mut ring = self.ring.lock().await;
        let frame = ring.read();
        drop(ring);

        permit.forget();
        self.free_slots.add_permits(1);
        frame
    }

    /// Store a frame only if a slot is free and the ring is not locked
    ///
    /// Returns `false` when the push would have had to wait.
    pub fn try_push(&self, frame: &Frame) -> bool {
        let Ok(permit) = self.free_slots.try_acquire() else {
            return false;
        };
        let Ok(mut ring) = self.ring.try_lock() else {
            return false;
        };
        ring.write(frame, self.max_line_len);
        drop(ring);

        permit.forget();
        self.ready_frames.add_permits(1);
        true
    }

    /// Take the oldest frame only if one is ready and the ring is not locked
    pub fn try_pop(&self) -> Option<Frame> {
        let permit = self.ready_frames.try_acquire().ok()?;
        let mut ring = self.ring.try_lock().ok()?;
        let frame = ring.read();
        drop(ring);

        permit.forget();
        self.free_slots.add_permits(1);
        Some(frame)
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames ready to be popped
    pub fn len(&self) -> usize {
        self.ready_frames.available_permits()
    }

    /// Whether no frame is ready
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every slot is taken
    pub fn is_full(&self) -> bool {
        self.free_slots.available_permits() == 0
    }

    /// Free slots a producer can fill without waiting
    pub fn free_slots(&self) -> usize {
        self.free_slots.available_permits()
    }
}
