//! # Mirror Storage
//!
//! Implementations of [`MirrorService`](super::traits::MirrorService), the
//! remote copy of each day file that every check-in station writes to.

pub mod folder;

#[cfg(test)]
pub mod memory;

pub use folder::{FolderDocument, FolderMirror};
