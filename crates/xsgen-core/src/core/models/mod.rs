//! # Core Models Module
//!
//! The reactor object model as far as cross-section generation needs it.
//!
//! ## Key Components
//!
//! - [`ids`] - Cross-section identifiers and slot-map keys for blocks
//! - [`block`] - Blocks, the regions cross sections are generated for
//! - [`reactor`] - The reactor, its core, and the library attached to the core
//!
//! ## Usage
//!
//! ```ignore
//! use xsgen::core::models::{block::Block, reactor::{Core, Reactor}};
//!
//! let mut core = Core::new("core");
//! core.add_block(Block::new("fuel-1", "A").with_burnup(3.2));
//! let reactor = Reactor::new("reactor", core);
//! ```

pub mod block;
pub mod ids;
pub mod reactor;
