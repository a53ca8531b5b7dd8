//! tristrip-rs
//!
//! Triangle strip generation for indexed triangle meshes, optimized for the post-transform vertex cache.
//!
//! # Example
//!
//! ```
//! use tristrip_rs::{PrimitiveType, TriStrip};
//!
//! // two triangles sharing the 1-2 edge
//! let groups = TriStrip::default().generate_strips(&[0, 1, 2, 2, 1, 3]).unwrap();
//!
//! assert_eq!(groups[0].primitive_type, PrimitiveType::Strip);
//! assert_eq!(groups[0].triangles().len(), 2);
//! ```
//!
//! # Features
//!
//! * `cli`: Builds the `strip_bench` binary

pub mod error;
mod hash;
pub mod stripify;
pub mod topology;
pub mod tristrip;
pub mod vertex;

pub use crate::error::StripifyError;
pub use crate::topology::Face;
pub use crate::tristrip::{CacheSize, PrimitiveGroup, PrimitiveType, TriStrip};

pub const INVALID_INDEX: u32 = u32::MAX;

/// Separates strips inside a single index buffer.
pub const RESTART_INDEX: u32 = u32::MAX;
