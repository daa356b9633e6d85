//! Single-owner locking for vault folders.
//!
//! The vault session depends only on the [`LockService`] trait. Two
//! implementations are provided:
//! - [`FileLockService`]: advisory OS file locks, exclusive across processes
//! - [`MemoryLockService`]: in-process bookkeeping, for tests

pub mod file;
pub mod memory;
pub mod service;

pub use file::FileLockService;
pub use memory::MemoryLockService;
pub use service::LockService;
