//! BufferManager keeps a bounded set of disk pages resident in fixed-size
//! frames, evicting with the clock (second-chance) algorithm and writing
//! dirty pages back before their frame is reused.

use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

use crate::buffer::frame::{Frame, FrameId};
use crate::buffer::page_table::PageTable;
use crate::config::BufferPoolConfig;
use crate::error::{FramePoolError, FramePoolResult};
use crate::storage::disk_manager::{DiskManager, FileId};
use crate::storage::page::{PageId, INVALID_PAGE_ID};

/// Read-only view of one frame's descriptor, for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub frame_id: FrameId,
    pub file_id: Option<FileId>,
    pub file: Option<String>,
    pub page_id: PageId,
    pub pin_count: u32,
    pub dirty: bool,
    pub ref_bit: bool,
}

impl FrameSnapshot {
    pub fn is_valid(&self) -> bool {
        self.file_id.is_some()
    }
}

#[derive(Debug)]
pub struct BufferManager {
    frames: Vec<Frame>,
    page_table: PageTable,
    // Next candidate position for the replacement scan. Mutated only by
    // `allocate_frame`; starts at the last frame so the first advance
    // lands on frame 0.
    clock_hand: usize,
}

impl BufferManager {
    pub fn new(num_frames: usize) -> Self {
        Self::new_with_config(BufferPoolConfig {
            buffer_pool_size: num_frames,
        })
    }

    pub fn new_with_config(config: BufferPoolConfig) -> Self {
        let num_frames = config.buffer_pool_size;
        assert!(num_frames > 0, "buffer pool needs at least one frame");
        let mut frames = Vec::with_capacity(num_frames);
        frames.resize_with(num_frames, Frame::new);
        Self {
            frames,
            page_table: PageTable::new(),
            clock_hand: num_frames - 1,
        }
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// The page bytes held by `frame_id`. Only meaningful while the caller
    /// keeps the page pinned.
    pub fn page(&self, frame_id: FrameId) -> &[u8] {
        &self.frames[frame_id].data
    }

    pub fn page_mut(&mut self, frame_id: FrameId) -> &mut [u8] {
        &mut self.frames[frame_id].data
    }

    /// Makes `page_id` of `file` resident and pinned, returning the frame
    /// holding it.
    ///
    /// A hit costs no I/O; a miss performs exactly one read, plus at most
    /// one writeback if the chosen frame held a dirty victim.
    pub fn fetch_page(
        &mut self,
        file: &Arc<DiskManager>,
        page_id: PageId,
    ) -> FramePoolResult<FrameId> {
        if page_id == INVALID_PAGE_ID {
            return Err(FramePoolError::Storage(
                "fetch_page: invalid page id".to_string(),
            ));
        }
        if let Some(frame_id) = self.page_table.lookup(file.file_id(), page_id) {
            let desc = &mut self.frames[frame_id].desc;
            desc.pin_count += 1;
            desc.ref_bit = true;
            return Ok(frame_id);
        }

        let frame_id = self.allocate_frame()?;
        // Read before the frame takes on the new identity, so a failed read
        // leaves the frame empty instead of half-loaded.
        let page = file.read_page(page_id)?;
        let frame = &mut self.frames[frame_id];
        frame.data.copy_from_slice(&page);
        frame.desc.set_loaded(Arc::clone(file), page_id);
        self.page_table.insert(file.file_id(), page_id, frame_id);
        Ok(frame_id)
    }

    /// Releases one pin on a resident page. `is_dirty` ORs into the
    /// descriptor's dirty flag; a clean unpin never clears it.
    ///
    /// Unpinning a page that is no longer resident is a no-op: it was
    /// already evicted and owes nothing.
    pub fn unpin_page(
        &mut self,
        file: &DiskManager,
        page_id: PageId,
        is_dirty: bool,
    ) -> FramePoolResult<()> {
        let Some(frame_id) = self.page_table.lookup(file.file_id(), page_id) else {
            return Ok(());
        };
        let desc = &mut self.frames[frame_id].desc;
        if desc.pin_count == 0 {
            return Err(FramePoolError::PageNotPinned {
                file: file.filename(),
                page_id,
                frame_id,
            });
        }
        desc.pin_count -= 1;
        desc.dirty |= is_dirty;
        Ok(())
    }

    /// Allocates a brand-new page in `file` and loads it pinned into a
    /// frame, returning the assigned page number and the frame.
    pub fn alloc_page(
        &mut self,
        file: &Arc<DiskManager>,
    ) -> FramePoolResult<(PageId, FrameId)> {
        let page_id = file.allocate_page()?;
        let frame_id = self.fetch_page(file, page_id)?;
        Ok((page_id, frame_id))
    }

    /// Drops `page_id` of `file` from the pool (no writeback, no pin check;
    /// deletion supersedes any pending write) and deletes it from the file.
    pub fn dispose_page(&mut self, file: &DiskManager, page_id: PageId) -> FramePoolResult<()> {
        if let Some(frame_id) = self.page_table.lookup(file.file_id(), page_id) {
            self.frames[frame_id].desc.clear();
            self.page_table.remove(file.file_id(), page_id);
        }
        file.deallocate_page(page_id)
    }

    /// Writes back every dirty page of `file` and drops all of its pages
    /// from the pool.
    ///
    /// Frames are scanned in ascending index order. Hitting a pinned page
    /// aborts with `PagePinned`; frames processed before it stay flushed
    /// and cleared, so the caller retries the whole flush after releasing
    /// its pins.
    pub fn flush_file(&mut self, file: &DiskManager) -> FramePoolResult<()> {
        for frame_id in 0..self.frames.len() {
            let frame = &mut self.frames[frame_id];
            let Some(owner) = frame.desc.file.clone() else {
                continue;
            };
            if owner.file_id() != file.file_id() {
                continue;
            }
            let page_id = frame.desc.page_id;
            if frame.desc.pin_count > 0 {
                return Err(FramePoolError::PagePinned {
                    file: owner.filename(),
                    page_id,
                    frame_id,
                });
            }
            if frame.desc.dirty {
                owner.write_page(page_id, &frame.data)?;
                frame.desc.dirty = false;
            }
            frame.desc.clear();
            self.page_table.remove(owner.file_id(), page_id);
        }
        debug!("Flushed all pages of '{}'", file.filename());
        Ok(())
    }

    pub fn snapshots(&self) -> Vec<FrameSnapshot> {
        self.frames
            .iter()
            .enumerate()
            .map(|(frame_id, frame)| FrameSnapshot {
                frame_id,
                file_id: frame.desc.file.as_ref().map(|f| f.file_id()),
                file: frame.desc.file.as_ref().map(|f| f.filename()),
                page_id: frame.desc.page_id,
                pin_count: frame.desc.pin_count,
                dirty: frame.desc.dirty,
                ref_bit: frame.desc.ref_bit,
            })
            .collect()
    }

    pub fn valid_frame_count(&self) -> usize {
        self.frames.iter().filter(|f| f.desc.is_valid()).count()
    }

    fn advance_clock(&mut self) {
        self.clock_hand = (self.clock_hand + 1) % self.frames.len();
    }

    /// Clock frame allocator: returns a frame usable for a new resident
    /// page, evicting (and writing back) an unpinned, unreferenced victim
    /// if no frame is empty.
    ///
    /// The scan inspects at most `2 * num_frames` positions: one rotation
    /// can do no better than clear every reference bit, and the next must
    /// then reach an unpinned frame if one exists.
    fn allocate_frame(&mut self) -> FramePoolResult<FrameId> {
        let num_frames = self.frames.len();
        for _ in 0..2 * num_frames {
            self.advance_clock();
            let hand = self.clock_hand;
            let frame = &mut self.frames[hand];
            let Some(file) = frame.desc.file.clone() else {
                return Ok(hand);
            };
            if frame.desc.ref_bit {
                // Second chance.
                frame.desc.ref_bit = false;
                continue;
            }
            if frame.desc.pin_count > 0 {
                continue;
            }
            let page_id = frame.desc.page_id;
            if frame.desc.dirty {
                debug!(
                    "Evicting dirty page {} of '{}' from frame {}",
                    page_id,
                    file.filename(),
                    hand
                );
                file.write_page(page_id, &frame.data)?;
            }
            frame.desc.clear();
            self.page_table.remove(file.file_id(), page_id);
            return Ok(hand);
        }
        warn!("Buffer exceeded: all {} frames are pinned", num_frames);
        Err(FramePoolError::BufferExceeded { num_frames })
    }
}

impl fmt::Display for BufferManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for snapshot in self.snapshots() {
            match snapshot.file {
                Some(file) => writeln!(
                    f,
                    "frame {}: '{}' page {} pin_count {} dirty {} ref_bit {}",
                    snapshot.frame_id,
                    file,
                    snapshot.page_id,
                    snapshot.pin_count,
                    snapshot.dirty,
                    snapshot.ref_bit
                )?,
                None => writeln!(f, "frame {}: empty", snapshot.frame_id)?,
            }
        }
        write!(f, "valid frames: {}", self.valid_frame_count())
    }
}
