pub mod cache;
pub mod remap;
