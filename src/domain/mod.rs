//! Domain layer: tree engine, layout, complexity estimate and render snapshot
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod complexity;
pub mod entities;
pub mod error;
pub mod layout;
pub mod scene;

pub use arena::{BstArena, BstNode};
pub use complexity::{balanced_height, estimate, Verdict};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use layout::{Layout, LayoutConfig, LayoutPosition, Viewport};
pub use scene::{Scene, SceneNode, ToTermTree};
