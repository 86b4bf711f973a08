use std::time::Duration;

use crate::core::repr::EthernetAddress;
use crate::core::storage::Ring;

#[derive(Debug)]
pub enum Error {
    /// Indicates that the device cannot accept more frames right now.
    Busy,
    /// Indicates that the device has no frames to read.
    Nothing,
    /// Indicates a generic IO error.
    IO(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A low level interface for exchanging raw Ethernet frames with a link.
///
/// Devices never block in send(...) or recv(...). Callers wanting to block
/// until frames arrive should use wait(...).
pub trait Device {
    /// Sends a frame across the link.
    ///
    /// # Errors
    ///
    /// Returns Error::Busy if the transmit ring is full and the frame should
    /// be retried later.
    fn send(&mut self, buffer: &[u8]) -> Result<()>;

    /// Reads a frame into the buffer and returns the size of the frame. You
    /// should ensure that the buffer has at least MTU bytes to avoid
    /// truncated frames.
    ///
    /// # Errors
    ///
    /// Returns Error::Nothing if there are no frames to read.
    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Returns the [MTU](https://en.wikipedia.org/wiki/Maximum_transmission_unit)
    /// of the device.
    fn max_transmission_unit(&self) -> usize;

    /// Returns the Ethernet address of the device.
    fn ethernet_addr(&self) -> EthernetAddress;

    /// Returns the number of bytes the device needs in front of each frame
    /// for its own encapsulation.
    fn headroom(&self) -> usize {
        0
    }

    /// Checks if a frame can be read without blocking.
    fn is_readable(&self) -> bool;

    /// Blocks until a frame can be read or the timeout elapses, and returns
    /// whether the device is readable.
    fn wait(&mut self, timeout: Option<Duration>) -> Result<bool>;
}

/// An in memory Device backed by a ring of pending frames.
///
/// Tests and demos push frames with push_rx(...) and inspect whatever was
/// sent with pop_tx(...).
#[derive(Debug)]
pub struct Buffered {
    rx: Ring<Vec<u8>>,
    tx: Vec<Vec<u8>>,
    eth_addr: EthernetAddress,
    mtu: usize,
    headroom: usize,
    busy_sends: usize,
    faulted: bool,
}

impl Buffered {
    /// Creates a device that queues up to rx_len received frames.
    pub fn new(eth_addr: EthernetAddress, rx_len: usize) -> Buffered {
        Buffered {
            rx: Ring::from(vec![Vec::new(); rx_len]),
            tx: Vec::new(),
            eth_addr,
            mtu: 1500,
            headroom: 0,
            busy_sends: 0,
            faulted: false,
        }
    }

    pub fn with_headroom(mut self, headroom: usize) -> Buffered {
        self.headroom = headroom;
        self
    }

    /// Queues a frame for reception.
    pub fn push_rx(&mut self, frame: &[u8]) -> crate::Result<()> {
        self.rx.enqueue_with(|slot| {
            slot.clear();
            slot.extend_from_slice(frame);
        })
    }

    /// Returns the oldest frame sent through the device.
    pub fn pop_tx(&mut self) -> Option<Vec<u8>> {
        if self.tx.is_empty() {
            None
        } else {
            Some(self.tx.remove(0))
        }
    }

    /// Returns the number of sent frames not yet popped.
    pub fn tx_len(&self) -> usize {
        self.tx.len()
    }

    /// Makes the next sends report a full transmit ring.
    pub fn set_busy_sends(&mut self, sends: usize) {
        self.busy_sends = sends;
    }

    /// Makes every subsequent recv(...) fail with an IO error.
    pub fn set_faulted(&mut self, faulted: bool) {
        self.faulted = faulted;
    }
}

impl Device for Buffered {
    fn send(&mut self, buffer: &[u8]) -> Result<()> {
        if self.busy_sends > 0 {
            self.busy_sends -= 1;
            return Err(Error::Busy);
        }

        self.tx.push(buffer.to_vec());
        Ok(())
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if self.faulted {
            return Err(Error::IO(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device faulted",
            )));
        }

        self.rx
            .dequeue_with(|frame| {
                let len = std::cmp::min(frame.len(), buffer.len());
                buffer[.. len].copy_from_slice(&frame[.. len]);
                len
            })
            .map_err(|_| Error::Nothing)
    }

    fn max_transmission_unit(&self) -> usize {
        self.mtu
    }

    fn ethernet_addr(&self) -> EthernetAddress {
        self.eth_addr
    }

    fn headroom(&self) -> usize {
        self.headroom
    }

    fn is_readable(&self) -> bool {
        !self.rx.is_empty()
    }

    fn wait(&mut self, _: Option<Duration>) -> Result<bool> {
        Ok(self.is_readable())
    }
}
