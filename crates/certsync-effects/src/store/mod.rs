//! Record store handlers

pub mod memory;

pub use memory::MemoryRecordStore;
