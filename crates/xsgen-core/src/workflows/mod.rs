//! # Workflows Module
//!
//! High-level entry points that tie the [`crate::engine`] and [`crate::core`] layers
//! together into complete runs.
//!
//! - **Operate Workflow** ([`operate`]) - Steps a reactor through cycles, time nodes and
//!   coupled iterations, keeping its cross-section library current and depleting its
//!   blocks between nodes.

pub mod operate;
