// # Link Store Implementations
//
// This module provides implementations of the LinkStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::FileLinkStore;
pub use memory::MemoryLinkStore;
