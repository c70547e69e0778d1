use thiserror::Error;

use crate::buffer::FrameId;
use crate::storage::PageId;

pub type FramePoolResult<T, E = FramePoolError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum FramePoolError {
    #[error("Buffer exceeded: all {num_frames} frames are pinned")]
    BufferExceeded { num_frames: usize },

    #[error("Page {page_id} of file '{file}' is not pinned (frame {frame_id})")]
    PageNotPinned {
        file: String,
        page_id: PageId,
        frame_id: FrameId,
    },

    #[error("Page {page_id} of file '{file}' is pinned (frame {frame_id})")]
    PagePinned {
        file: String,
        page_id: PageId,
        frame_id: FrameId,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
