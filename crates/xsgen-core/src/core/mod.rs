//! # Core Module
//!
//! Stateless building blocks for cross-section library management: the reactor model
//! the lattice physics interface reads, the in-memory library store, and library file
//! I/O.
//!
//! ## Architecture
//!
//! - **Reactor Representation** ([`models`]) - XS identifiers, blocks, reactor and core
//! - **Library Store** ([`library`]) - Identifier-keyed multigroup data and the core's library slot
//! - **File I/O** ([`io`]) - Reading/writing library files behind a format-agnostic trait
//!
//! Nothing in this module decides *when* data is generated; that belongs to the
//! [`engine`](crate::engine).

pub mod io;
pub mod library;
pub mod models;
