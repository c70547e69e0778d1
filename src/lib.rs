pub mod buffer;
pub mod config;
pub mod error;
pub mod storage;

pub use buffer::{BufferManager, FrameId};
pub use error::{FramePoolError, FramePoolResult};
pub use storage::{DiskManager, PageId, PAGE_SIZE};
