//! Local mirror adapters.

mod file;
mod memory;

pub use file::FileMirror;
pub use memory::MemoryMirror;
