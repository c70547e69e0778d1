pub mod buffer_manager;
pub mod frame;
pub mod page_table;

pub use buffer_manager::{BufferManager, FrameSnapshot};
pub use frame::{Frame, FrameDesc, FrameId};
pub use page_table::PageTable;
