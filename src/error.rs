use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StripifyError {
    #[error("Index count {count} is not a multiple of 3")]
    InvalidIndexCount { count: usize },
    #[error("Index {index} out of range, largest allowed index is {max}")]
    IndexOutOfRange { index: u32, max: u32 },
    #[error("Cache size must be at least 1")]
    InvalidCacheSize,
    #[error("Index {index} references a vertex past the end of the vertex buffer ({vertex_count} vertices)")]
    VertexBufferTooSmall { index: u32, vertex_count: usize },
    #[error("Vertex buffer of length {len} can't hold vertices of size {vertex_size}")]
    InvalidVertexSize { len: usize, vertex_size: usize },
}

pub type Result<T> = std::result::Result<T, StripifyError>;
