//! Summary selection, timeline, and assembly.

pub mod allocator;
pub mod assembler;
pub mod timeline;

pub use allocator::{allocate, AllocationPolicy};
pub use assembler::SummaryAssembler;
pub use timeline::build_timeline;
