//! # Memory Management
//!
//! Component storage. One [`SlotArena`] per component kind, slots recycled
//! through an intrusive free list so indices stay stable while occupied.

pub mod arena;

pub use arena::SlotArena;
