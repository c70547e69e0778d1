use log::debug;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::error::{FramePoolError, FramePoolResult};
use crate::storage::page::{PageId, INVALID_PAGE_ID, PAGE_SIZE};

pub type FileId = u64;

static EMPTY_PAGE: [u8; PAGE_SIZE] = [0; PAGE_SIZE];

/// Process-wide counter handing out a distinct identity per opened file.
static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

/// Page-granular access to a single database file.
///
/// Pages are opaque fixed-size byte buffers to this layer; page `p` lives at
/// byte offset `(p - 1) * PAGE_SIZE`. Page id 0 is reserved as invalid.
#[derive(Debug)]
pub struct DiskManager {
    file_id: FileId,
    path: PathBuf,
    next_page_id: AtomicU32,
    free_pages: Mutex<Vec<PageId>>,
    // Use a mutex to wrap the file handle to ensure that only one thread
    // can access the file at the same time among multiple threads.
    db_file: Mutex<File>,
}

impl DiskManager {
    pub fn try_new(db_path: impl AsRef<Path>) -> FramePoolResult<Self> {
        let db_path = db_path.as_ref();
        let db_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(db_path)?;

        let db_file_len = db_file.metadata()?.len();
        if db_file_len % PAGE_SIZE as u64 != 0 {
            return Err(FramePoolError::Storage(format!(
                "db file size {} is not a multiple of page size {}",
                db_file_len, PAGE_SIZE
            )));
        }
        let next_page_id = (db_file_len / PAGE_SIZE as u64 + 1) as PageId;

        let file_id = NEXT_FILE_ID.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Opened disk manager for {:?} (file_id {}, next_page_id {})",
            db_path, file_id, next_page_id
        );

        Ok(Self {
            file_id,
            path: db_path.to_path_buf(),
            next_page_id: AtomicU32::new(next_page_id),
            free_pages: Mutex::new(Vec::new()),
            db_file: Mutex::new(db_file),
        })
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> String {
        self.path.display().to_string()
    }

    pub fn read_page(&self, page_id: PageId) -> FramePoolResult<[u8; PAGE_SIZE]> {
        self.check_page_exists("read_page", page_id)?;
        let mut guard = self.db_file.lock();
        guard.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        let mut page = [0u8; PAGE_SIZE];
        guard.read_exact(&mut page)?;
        Ok(page)
    }

    pub fn write_page(&self, page_id: PageId, data: &[u8]) -> FramePoolResult<()> {
        self.check_page_exists("write_page", page_id)?;
        if data.len() != PAGE_SIZE {
            return Err(FramePoolError::Internal(format!(
                "Page size is not {}",
                PAGE_SIZE
            )));
        }
        let mut guard = self.db_file.lock();
        guard.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        guard.write_all(data)?;
        guard.flush()?;
        Ok(())
    }

    /// Grows the file by one zeroed page (or reuses a previously deallocated
    /// one) and returns its page id.
    pub fn allocate_page(&self) -> FramePoolResult<PageId> {
        if let Some(page_id) = self.free_pages.lock().pop() {
            // Deallocation already zeroed the page on disk.
            return Ok(page_id);
        }
        let page_id = self.next_page_id.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.db_file.lock();
        guard.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        guard.write_all(&EMPTY_PAGE)?;
        guard.flush()?;
        Ok(page_id)
    }

    /// Zeroes the page on disk and marks its id reusable. The file is never
    /// shrunk.
    pub fn deallocate_page(&self, page_id: PageId) -> FramePoolResult<()> {
        self.check_page_exists("deallocate_page", page_id)?;
        {
            let mut guard = self.db_file.lock();
            guard.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
            guard.write_all(&EMPTY_PAGE)?;
            guard.flush()?;
        }
        self.free_pages.lock().push(page_id);
        Ok(())
    }

    pub fn db_file_len(&self) -> FramePoolResult<u64> {
        let guard = self.db_file.lock();
        let meta = guard.metadata()?;
        Ok(meta.len())
    }

    fn check_page_exists(&self, op: &str, page_id: PageId) -> FramePoolResult<()> {
        if page_id == INVALID_PAGE_ID {
            return Err(FramePoolError::Storage(format!(
                "{}: invalid page id",
                op
            )));
        }
        if page_id >= self.next_page_id.load(Ordering::SeqCst) {
            return Err(FramePoolError::Storage(format!(
                "{}: page {} does not exist in '{}'",
                op,
                page_id,
                self.filename()
            )));
        }
        Ok(())
    }

    fn page_offset(page_id: PageId) -> u64 {
        (page_id - 1) as u64 * PAGE_SIZE as u64
    }
}
