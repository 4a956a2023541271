//! Binary search tree visualizer.
//!
//! Insert and search operations record the decision path they take
//! (go left, go right, found). A [`application::Session`] replays those
//! paths as paced highlight frames while the layout engine keeps node
//! coordinates in sync with the tree.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
