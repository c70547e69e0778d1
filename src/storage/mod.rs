pub mod disk_manager;
pub mod page;

pub use disk_manager::{DiskManager, FileId};
pub use page::{PageId, INVALID_PAGE_ID, PAGE_SIZE};
