use std::collections::HashMap;

use crate::buffer::frame::FrameId;
use crate::storage::disk_manager::FileId;
use crate::storage::page::PageId;

/// Maps the identity of a resident page, `(FileId, PageId)`, to the frame
/// currently holding it. A miss is an expected outcome and is reported as
/// `None`, never as an error.
#[derive(Debug, Default)]
pub struct PageTable {
    entries: HashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_id: FileId, page_id: PageId, frame_id: FrameId) {
        self.entries.insert((file_id, page_id), frame_id);
    }

    pub fn lookup(&self, file_id: FileId, page_id: PageId) -> Option<FrameId> {
        self.entries.get(&(file_id, page_id)).copied()
    }

    /// Removing an absent identity is a no-op.
    pub fn remove(&mut self, file_id: FileId, page_id: PageId) {
        self.entries.remove(&(file_id, page_id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
