//! # xsgen Core Library
//!
//! Keeps a reactor core's multigroup cross-section library in step with the cross-section
//! identifiers its blocks require, running external lattice physics calculations only
//! when the attached library is missing data.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture to keep concerns separate and
//! each layer testable on its own.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`XsId`, `Block`, `Reactor`),
//!   the immutable cross-section library with its shared slot, and library file I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful protocol: configuration, the pure
//!   regeneration decision, lattice physics backends and job dispatch, and the
//!   `LatticePhysicsInterface` that ties them together at each coupled iteration.
//!
//! - **[`workflows`]: The Public API.** Complete runs that step a reactor through cycles
//!   and time nodes, driving the engine and reporting progress.

pub mod core;
pub mod engine;
pub mod workflows;
