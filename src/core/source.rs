//! Packet sources and sinks.
//!
//! A packet source owns a Device, a BufferAllocator and a ring of receive
//! buffers posted ahead of time. Frames are handed out as owned FrameBuffers
//! and must come back through either transmit(...) or release(...).

use std::collections::VecDeque;
use std::time::Duration;

use crate::core::dev::{
    Device,
    Error as DevError,
};
use crate::core::repr::EthernetAddress;
use crate::core::storage::{
    BufferAllocator,
    FrameBuffer,
};
use crate::{
    Error,
    Result,
};

/// Number of receive buffers a source keeps posted by default.
pub const DEFAULT_RX_RING_LEN: usize = 16;

/// Outcome of a single non-blocking receive.
#[derive(Debug)]
pub enum Recv {
    /// A frame was received and nothing else is pending.
    Frame(FrameBuffer),
    /// A frame was received and more frames are pending, so the caller
    /// should keep polling before yielding.
    More(FrameBuffer),
    /// No frames are available.
    Empty,
}

/// Outcome of a transmit attempt.
#[derive(Debug)]
pub enum Transmit {
    /// The frame was handed to the device and its buffer freed.
    Committed,
    /// The transmit ring is full. The frame is handed back for a retry.
    Busy(FrameBuffer),
}

/// A supplier of received frames and a sink for frames to transmit.
pub trait PacketSource {
    /// Returns the Ethernet address of the underlying device.
    fn ethernet_addr(&self) -> EthernetAddress;

    /// Allocates up to count receive buffers, each large enough for the
    /// device headroom plus a full frame. Fewer buffers, possibly none, are
    /// returned when the allocator runs dry.
    fn allocate_receive_buffers(&mut self, count: usize) -> Vec<FrameBuffer>;

    /// Tries to receive a single frame without blocking.
    ///
    /// # Errors
    ///
    /// Only unrecoverable device errors are returned.
    fn receive_one(&mut self) -> Result<Recv>;

    /// Tries to hand a frame to the device for transmission.
    ///
    /// # Errors
    ///
    /// Only unrecoverable device errors are returned, in which case the frame
    /// is released.
    fn transmit(&mut self, frame: FrameBuffer) -> Result<Transmit>;

    /// Returns a buffer to the allocator without transmitting it.
    fn release(&mut self, frame: FrameBuffer);
}

/// Receive and transmit plumbing shared by the polling and interrupt driven
/// sources.
struct Port<D: Device, A: BufferAllocator> {
    dev: D,
    allocator: A,
    posted: VecDeque<FrameBuffer>,
    rx_ring_len: usize,
    exhausted: bool,
}

impl<D: Device, A: BufferAllocator> Port<D, A> {
    fn new(dev: D, allocator: A, rx_ring_len: usize) -> Port<D, A> {
        let mut port = Port {
            dev,
            allocator,
            posted: VecDeque::with_capacity(rx_ring_len),
            rx_ring_len,
            exhausted: false,
        };
        port.refill();
        port
    }

    fn allocate_receive_buffers(&mut self, count: usize) -> Vec<FrameBuffer> {
        let headroom = self.dev.headroom();
        let mut buffers = Vec::with_capacity(count);

        while buffers.len() < count {
            match self.allocator.alloc() {
                Some(buffer) => {
                    if buffer.headroom() < headroom {
                        warn!(
                            "Allocated buffer has {} bytes of headroom, device needs {}.",
                            buffer.headroom(),
                            headroom
                        );
                        self.allocator.free(buffer);
                        break;
                    }
                    buffers.push(buffer);
                }
                None => break,
            }
        }

        buffers
    }

    /// Tops up the receive ring. Running out of buffers only reduces how many
    /// frames can be in flight, and is logged once per shortage.
    fn refill(&mut self) {
        let missing = self.rx_ring_len - self.posted.len();
        if missing > 0 {
            let buffers = self.allocate_receive_buffers(missing);
            self.posted.extend(buffers);
        }

        let exhausted = self.posted.len() < self.rx_ring_len;
        if exhausted && !self.exhausted {
            warn!(
                "Allocator exhausted, posted {} of {} receive buffers.",
                self.posted.len(),
                self.rx_ring_len
            );
        } else if !exhausted && self.exhausted {
            info!("Receive ring refilled with {} buffers.", self.rx_ring_len);
        }
        self.exhausted = exhausted;
    }

    fn receive_one(&mut self) -> Result<Recv> {
        self.refill();

        let mut buffer = match self.posted.pop_front() {
            Some(buffer) => buffer,
            None => return Ok(Recv::Empty),
        };

        match self.dev.recv(buffer.spare_mut()) {
            Ok(0) | Err(DevError::Nothing) => {
                self.posted.push_front(buffer);
                Ok(Recv::Empty)
            }
            Ok(len) => {
                buffer.try_resize(len)?;
                if self.dev.is_readable() {
                    Ok(Recv::More(buffer))
                } else {
                    Ok(Recv::Frame(buffer))
                }
            }
            Err(err) => {
                self.posted.push_front(buffer);
                Err(Error::Device(err))
            }
        }
    }

    fn transmit(&mut self, frame: FrameBuffer) -> Result<Transmit> {
        match self.dev.send(&frame) {
            Ok(()) => {
                self.allocator.free(frame);
                Ok(Transmit::Committed)
            }
            Err(DevError::Busy) => Ok(Transmit::Busy(frame)),
            Err(err) => {
                self.allocator.free(frame);
                Err(Error::Device(err))
            }
        }
    }

    fn release(&mut self, frame: FrameBuffer) {
        self.allocator.free(frame);
    }
}

/// A PacketSource that is polled for frames.
pub struct PollingSource<D: Device, A: BufferAllocator> {
    port: Port<D, A>,
}

impl<D: Device, A: BufferAllocator> PollingSource<D, A> {
    /// Creates a source over dev, posting rx_ring_len receive buffers taken
    /// from allocator.
    pub fn new(dev: D, allocator: A, rx_ring_len: usize) -> PollingSource<D, A> {
        PollingSource {
            port: Port::new(dev, allocator, rx_ring_len),
        }
    }

    /// Returns the number of receive buffers currently posted.
    pub fn posted(&self) -> usize {
        self.port.posted.len()
    }

    /// Checks if the allocator could not fill the receive ring on the last
    /// refill.
    pub fn is_exhausted(&self) -> bool {
        self.port.exhausted
    }

    pub fn dev(&self) -> &D {
        &self.port.dev
    }

    pub fn dev_mut(&mut self) -> &mut D {
        &mut self.port.dev
    }

    pub fn allocator(&self) -> &A {
        &self.port.allocator
    }
}

/// A PacketSource that waits for the device to signal pending frames and
/// pushes them to a callback.
pub struct InterruptSource<D: Device, A: BufferAllocator> {
    port: Port<D, A>,
}

impl<D: Device, A: BufferAllocator> InterruptSource<D, A> {
    /// Creates a source over dev, posting rx_ring_len receive buffers taken
    /// from allocator.
    pub fn new(dev: D, allocator: A, rx_ring_len: usize) -> InterruptSource<D, A> {
        InterruptSource {
            port: Port::new(dev, allocator, rx_ring_len),
        }
    }

    /// Blocks until the device signals pending frames or the timeout elapses,
    /// then hands every available frame to f. The callback gets the source
    /// back so it can transmit or release the frame.
    ///
    /// # Returns
    ///
    /// The number of frames delivered, or the first error from either the
    /// device or the callback.
    pub fn dispatch<F>(&mut self, timeout: Option<Duration>, mut f: F) -> Result<usize>
    where
        F: FnMut(&mut Self, FrameBuffer) -> Result<()>,
    {
        if !self.port.dev.wait(timeout)? {
            return Ok(0);
        }

        let mut delivered = 0;

        loop {
            match self.receive_one()? {
                Recv::More(frame) => {
                    delivered += 1;
                    f(self, frame)?;
                }
                Recv::Frame(frame) => {
                    delivered += 1;
                    f(self, frame)?;
                    break;
                }
                Recv::Empty => break,
            }
        }

        self.port.refill();

        Ok(delivered)
    }

    /// Returns the number of receive buffers currently posted.
    pub fn posted(&self) -> usize {
        self.port.posted.len()
    }

    /// Checks if the allocator could not fill the receive ring on the last
    /// refill.
    pub fn is_exhausted(&self) -> bool {
        self.port.exhausted
    }

    pub fn dev(&self) -> &D {
        &self.port.dev
    }

    pub fn dev_mut(&mut self) -> &mut D {
        &mut self.port.dev
    }

    pub fn allocator(&self) -> &A {
        &self.port.allocator
    }
}

macro_rules! impl_packet_source {
    ($source:ident) => {
        impl<D: Device, A: BufferAllocator> PacketSource for $source<D, A> {
            fn ethernet_addr(&self) -> EthernetAddress {
                self.port.dev.ethernet_addr()
            }

            fn allocate_receive_buffers(&mut self, count: usize) -> Vec<FrameBuffer> {
                self.port.allocate_receive_buffers(count)
            }

            fn receive_one(&mut self) -> Result<Recv> {
                self.port.receive_one()
            }

            fn transmit(&mut self, frame: FrameBuffer) -> Result<Transmit> {
                self.port.transmit(frame)
            }

            fn release(&mut self, frame: FrameBuffer) {
                self.port.release(frame)
            }
        }
    };
}

impl_packet_source!(PollingSource);
impl_packet_source!(InterruptSource);
