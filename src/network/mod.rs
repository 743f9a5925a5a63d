//! Reaction networks
//!
//! This module provides the contract every reaction network implements and
//! the encoder that maps bounded population vectors to flat indices.
//!
//! # Core Concepts
//!
//! - **Reaction Network**: species, channels, stoichiometry and propensities
//! - **Bounded Network**: a network that also declares per-species population
//!   caps, which the master-equation solver needs to size its state space
//! - **State Space**: mixed-radix bijection between populations and indices
//!
//! # Architecture
//!
//! Networks are **separate from the engines**:
//! - The network provides the **kinetics** (who reacts, how fast)
//! - The engine provides the **method** (CME integration or SSA sampling)
//!
//! This separation allows:
//! - Same network under both the CME solver and the Gillespie engine
//! - Exact and reduced (tQSSA/sQSSA) networks compared with the same engine
//!
//! # Example
//!
//! ```rust
//! use sck_rs::network::StateSpace;
//!
//! # fn main() -> Result<(), sck_rs::error::KineticsError> {
//! let space = StateSpace::new(&[3, 4])?;
//! assert_eq!(space.len(), 12);
//! assert_eq!(space.encode(&[1, 2]), 6);
//! assert_eq!(space.decode(6), vec![1, 2]);
//! # Ok(())
//! # }
//! ```

mod state_space;
mod traits;

pub use state_space::{Populations, StateSpace};
pub use traits::{BoundedNetwork, ReactionNetwork};

pub(crate) use traits::check_shape;
