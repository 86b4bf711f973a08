use crate::core::storage::FrameBuffer;

/// A source of frame buffers for a packet source's receive ring.
///
/// Allocators are injected into a source when it is constructed, so the
/// buffer strategy is decided by whoever brings the device up.
pub trait BufferAllocator {
    /// Returns a fresh, empty buffer or None if the allocator is exhausted.
    fn alloc(&mut self) -> Option<FrameBuffer>;

    /// Gives a buffer back once its frame has been sent or discarded.
    ///
    /// The default implementation simply drops the buffer.
    fn free(&mut self, buffer: FrameBuffer) {
        drop(buffer);
    }
}

/// A fixed size pool of identically sized buffers.
///
/// The pool never grows past the count it was created with, so a consumer
/// that holds on to buffers will eventually see alloc() return None.
#[derive(Debug)]
pub struct Pool {
    free: Vec<FrameBuffer>,
    size: usize,
    headroom: usize,
    capacity: usize,
}

impl Pool {
    /// Creates a pool of size buffers, each with headroom bytes reserved in
    /// front of capacity frame bytes.
    pub fn new(size: usize, headroom: usize, capacity: usize) -> Pool {
        let free = (0 .. size)
            .map(|_| FrameBuffer::new(headroom, capacity))
            .collect();

        Pool {
            free,
            size,
            headroom,
            capacity,
        }
    }

    /// Returns the number of buffers currently available.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Returns the number of buffers handed out and not yet freed.
    pub fn in_use(&self) -> usize {
        self.size - self.free.len()
    }
}

impl BufferAllocator for Pool {
    fn alloc(&mut self) -> Option<FrameBuffer> {
        let mut buffer = self.free.pop()?;
        buffer.clear();
        Some(buffer)
    }

    fn free(&mut self, buffer: FrameBuffer) {
        if buffer.headroom() != self.headroom || buffer.capacity() != self.capacity {
            warn!("Pool::free(...) dropping a foreign buffer.");
            return;
        }

        if self.free.len() == self.size {
            warn!("Pool::free(...) dropping a buffer beyond the pool size.");
            return;
        }

        self.free.push(buffer);
    }
}

/// An allocator that hands out heap buffers until it has produced limit of
/// them, and never takes any back.
#[derive(Debug)]
pub struct Heap {
    headroom: usize,
    capacity: usize,
    limit: Option<usize>,
}

impl Heap {
    pub fn new(headroom: usize, capacity: usize) -> Heap {
        Heap {
            headroom,
            capacity,
            limit: None,
        }
    }

    /// Restricts the number of buffers the allocator will ever hand out.
    pub fn with_limit(mut self, limit: usize) -> Heap {
        self.limit = Some(limit);
        self
    }
}

impl BufferAllocator for Heap {
    fn alloc(&mut self) -> Option<FrameBuffer> {
        match self.limit {
            Some(0) => return None,
            Some(ref mut limit) => *limit -= 1,
            None => {}
        };

        Some(FrameBuffer::new(self.headroom, self.capacity))
    }
}
