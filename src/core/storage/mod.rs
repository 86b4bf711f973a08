//! Frame buffers, buffer allocators and ring storage.

pub mod frame;
pub mod pool;
pub mod ring;

pub use self::frame::{
    FrameBuffer,
    FRAME_CAPACITY,
};
pub use self::pool::{
    BufferAllocator,
    Heap,
    Pool,
};
pub use self::ring::Ring;
