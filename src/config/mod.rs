pub const DEFAULT_BUFFER_POOL_SIZE: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct BufferPoolConfig {
    /// Number of fixed-size frames owned by the buffer manager.
    pub buffer_pool_size: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        BufferPoolConfig {
            buffer_pool_size: DEFAULT_BUFFER_POOL_SIZE,
        }
    }
}
