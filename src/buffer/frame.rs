use std::sync::Arc;

use crate::storage::disk_manager::DiskManager;
use crate::storage::page::{PageId, INVALID_PAGE_ID, PAGE_SIZE};

pub type FrameId = usize;

/// Per-frame bookkeeping: which page lives here, how many callers hold it,
/// whether it diverged from disk, and the clock reference bit.
///
/// `file.is_some()` is the validity flag; an empty descriptor carries no
/// pin count and no dirty flag.
#[derive(Debug, Default)]
pub struct FrameDesc {
    pub file: Option<Arc<DiskManager>>,
    pub page_id: PageId,
    pub pin_count: u32,
    pub dirty: bool,
    pub ref_bit: bool,
}

impl FrameDesc {
    pub fn is_valid(&self) -> bool {
        self.file.is_some()
    }

    /// Marks the frame as holding `page_id` of `file`, pinned once by the
    /// caller that loaded it.
    pub fn set_loaded(&mut self, file: Arc<DiskManager>, page_id: PageId) {
        self.file = Some(file);
        self.page_id = page_id;
        self.pin_count = 1;
        self.dirty = false;
        self.ref_bit = true;
    }

    /// Returns the descriptor to the empty state.
    pub fn clear(&mut self) {
        self.file = None;
        self.page_id = INVALID_PAGE_ID;
        self.pin_count = 0;
        self.dirty = false;
        self.ref_bit = false;
    }
}

/// A slot of the frame arena: the descriptor co-located with the page
/// buffer it describes, both addressed by the same `FrameId`.
#[derive(Debug)]
pub struct Frame {
    pub desc: FrameDesc,
    pub data: Box<[u8]>,
}

impl Frame {
    pub fn new() -> Self {
        Frame {
            desc: FrameDesc::default(),
            data: vec![0u8; PAGE_SIZE].into_boxed_slice(),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
