//! Reading and writing cross-section library files.
//!
//! A trait-based interface ([`traits::LibraryFile`]) decouples the protocol from any
//! particular on-disk format; [`binary`] provides the framed binary container used by
//! the bundled backends, along with the file naming conventions for per-cycle and
//! per-identifier libraries.

pub mod binary;
pub mod traits;
