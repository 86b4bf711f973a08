use crate::{
    Error,
    Result,
};

/// Bounded FIFO over a fixed set of preallocated slots.
///
/// Slots are reused in place, so enqueueing a frame overwrites whatever the
/// slot held previously instead of allocating.
#[derive(Clone, Debug)]
pub struct Ring<T> {
    slots: Vec<T>,
    head: usize,
    len: usize,
}

impl<T> From<Vec<T>> for Ring<T> {
    fn from(slots: Vec<T>) -> Ring<T> {
        Ring {
            slots,
            head: 0,
            len: 0,
        }
    }
}

impl<T> Ring<T> {
    /// Applies f to the oldest occupied slot and frees it, or returns an
    /// error if the ring is empty.
    pub fn dequeue_with<'a, F, R>(&'a mut self, f: F) -> Result<R>
    where
        F: FnOnce(&'a mut T) -> R,
    {
        if self.len == 0 {
            return Err(Error::Exhausted);
        }

        let idx = self.head;
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;

        Ok(f(&mut self.slots[idx]))
    }

    /// Applies f to the next free slot so it can be filled in place, or
    /// returns an error if the ring is full. The slot is only committed if f
    /// succeeds.
    pub fn enqueue_maybe<'a, F, R>(&'a mut self, f: F) -> Result<R>
    where
        F: FnOnce(&'a mut T) -> Result<R>,
    {
        if self.len == self.slots.len() {
            return Err(Error::Exhausted);
        }

        let idx = (self.head + self.len) % self.slots.len();

        let res = f(&mut self.slots[idx])?;
        self.len += 1;
        Ok(res)
    }

    /// Similar to enqueue_maybe(...) for fills that cannot fail.
    pub fn enqueue_with<'a, F, R>(&'a mut self, f: F) -> Result<R>
    where
        F: FnOnce(&'a mut T) -> R,
    {
        self.enqueue_maybe(|slot| Ok(f(slot)))
    }

    /// Returns the current number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
