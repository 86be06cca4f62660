//! # Engine Module
//!
//! This module implements the stateful part of xsgen: the protocol that keeps a reactor
//! core's cross-section library consistent with the identifiers its blocks require.
//!
//! ## Overview
//!
//! At each coupled iteration the [`interface::LatticePhysicsInterface`] gathers the
//! representative block of every cross-section identifier, asks the decision engine
//! whether the attached library is sufficient, and, when it is not, dispatches lattice
//! physics jobs to a backend and attaches the merged result as a new library.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Run type, generation request and related settings
//! - **Decision Engine** ([`decision`]) - Pure regeneration rules and the burnup policy
//! - **Backends** ([`backend`]) - The lattice physics capability trait and the external-executable backend
//! - **Dispatch** ([`dispatch`]) - Runs jobs, in parallel with the `parallel` feature
//! - **Grouping** ([`grouping`]) - Burnup groups and representative blocks
//! - **Orchestration** ([`interface`]) - Time-node gating, regeneration and bookkeeping
//! - **Progress Monitoring** ([`progress`]) - Progress callbacks for front ends
//! - **Error Handling** ([`error`]) - Engine-level error types

pub mod backend;
pub mod config;
pub mod decision;
pub(crate) mod dispatch;
pub mod error;
pub mod grouping;
pub mod interface;
pub mod progress;
