//! # Lattice Physics Backends
//!
//! The lattice physics interface never talks to a particular code directly. It depends
//! on the [`LatticePhysicsBackend`] capability trait, which each lattice physics code
//! implements: where its executable lives, how one identifier's cross sections are
//! computed, and how libraries from earlier runs are found on disk.
//!
//! [`command::ExternalCommandBackend`] drives an arbitrary executable through input
//! and output files.

pub mod command;

use crate::core::io::binary::LibraryIoError;
use crate::core::library::xs_library::XsLibrary;
use crate::core::models::block::Block;
use crate::core::models::ids::XsId;
use crate::engine::config::{ConfigError, XsKind};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Lattice physics process exited with {status}: {stderr}")]
    ProcessFailed { status: String, stderr: String },

    #[error("Lattice physics run produced no output library at '{0}'")]
    MissingOutput(String),

    #[error("Cannot read library produced by lattice physics run: {0}")]
    Library(#[from] LibraryIoError),

    #[error("Cannot write lattice physics input: {0}")]
    InputSerialization(String),

    #[error("{0}")]
    Other(String),
}

/// One lattice physics calculation: the cross sections of a single identifier,
/// computed from its representative block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatticeJob {
    pub cycle: u32,
    pub xs_id: XsId,
    pub xs_type: String,
    pub bu_group: char,
    pub block_name: String,
    pub percent_bu: f64,
    pub include_gamma: bool,
}

impl LatticeJob {
    pub fn new(cycle: u32, xs_id: XsId, block: &Block, kind: XsKind) -> Self {
        Self {
            cycle,
            xs_type: xs_id.xs_type().to_string(),
            bu_group: xs_id.bu_group(),
            xs_id,
            block_name: block.name.clone(),
            percent_bu: block.percent_bu,
            include_gamma: kind.includes_gamma(),
        }
    }
}

/// The capabilities a lattice physics code provides to the interface.
pub trait LatticePhysicsBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Locates the lattice physics executable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ExecutableNotFound`] if the path cannot be resolved.
    fn executable_path(&self) -> Result<PathBuf, ConfigError>;

    /// Loads libraries left by an earlier run for `cycle`, if any exist.
    fn read_existing_libraries(&self, _cycle: u32) -> Result<Option<XsLibrary>, BackendError> {
        Ok(None)
    }

    /// Runs one calculation. The returned library must hold an entry for `job.xs_id`.
    fn compute(&self, job: &LatticeJob) -> Result<XsLibrary, BackendError>;

    /// Removes outputs of earlier calculations before a regeneration.
    fn clear(&self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Keeps the library generated on `cycle` for later runs.
    fn persist_library(&self, _cycle: u32, _library: &XsLibrary) -> Result<(), BackendError> {
        Ok(())
    }
}
