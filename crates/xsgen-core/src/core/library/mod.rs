//! # Library Module
//!
//! In-memory cross-section libraries and the slot through which a reactor core
//! exposes the library currently in use.
//!
//! - [`xs_library`] - The identifier-keyed store of multigroup data
//! - [`slot`] - Single-writer, whole-value-replace holder for the active library
//!
//! Libraries are values: regeneration produces a new [`xs_library::XsLibrary`] that
//! replaces the previous one in the [`slot::LibrarySlot`], so nothing ever observes a
//! half-updated library.

pub mod slot;
pub mod xs_library;
