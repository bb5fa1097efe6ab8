//! # Motive Model
//!
//! The data model for actor motivations - goals, their categories, audit notes
//! and the clocks that stamp them. This crate holds no registry logic; it is
//! the single definition of what a goal is.

pub mod categories;
pub mod clock;
pub mod error;
pub mod goal;

pub use categories::*;
pub use clock::*;
pub use error::GoalError;
pub use goal::*;
