use std::ops::{
    Deref,
    DerefMut,
};

use crate::{
    Error,
    Result,
};

/// Payload capacity of a receive buffer, excluding device headroom.
pub const FRAME_CAPACITY: usize = 2048;

/// Owned buffer holding one link layer frame.
///
/// The first `headroom` bytes are reserved for the device's encapsulation
/// headers and are never exposed through `Deref`. The frame itself is a
/// resizable view over the remaining capacity.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    storage: Vec<u8>,
    headroom: usize,
    len: usize,
}

impl FrameBuffer {
    /// Creates a zeroed, empty buffer with room for `capacity` frame bytes.
    pub fn new(headroom: usize, capacity: usize) -> FrameBuffer {
        FrameBuffer {
            storage: vec![0; headroom + capacity],
            headroom,
            len: 0,
        }
    }

    /// Creates a buffer holding a copy of frame.
    pub fn from_frame(headroom: usize, frame: &[u8]) -> FrameBuffer {
        let mut buffer = FrameBuffer::new(headroom, frame.len());
        buffer.len = frame.len();
        buffer.copy_from_slice(frame);
        buffer
    }

    pub fn headroom(&self) -> usize {
        self.headroom
    }

    /// Returns the maximum frame length the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.storage.len() - self.headroom
    }

    /// Returns the whole frame area regardless of the current length, for
    /// devices to receive into.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.headroom ..]
    }

    /// Attempts to resize the frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer does not have sufficient capacity.
    pub fn try_resize(&mut self, len: usize) -> Result<()> {
        if len > self.capacity() {
            return Err(Error::Exhausted);
        }

        self.len = len;

        Ok(())
    }

    /// Empties the frame so the buffer can be posted for reception again.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Deref for FrameBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.storage[self.headroom .. self.headroom + self.len]
    }
}

impl DerefMut for FrameBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.headroom .. self.headroom + self.len]
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl AsMut<[u8]> for FrameBuffer {
    fn as_mut(&mut self) -> &mut [u8] {
        self
    }
}
