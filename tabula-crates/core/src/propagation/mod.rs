//! Contains the main building blocks for propagators.
//!
//! # Background
//!
//! A propagator takes as input a set of domains and removes the values which cannot participate
//! in any solution of its constraint. The [`Solver`](crate::Solver) keeps a queue of variables
//! whose domains shrank; popping a variable calls [`Propagator::filter`] on every propagator
//! watching it, with the position of the variable in the scope of the propagator as trigger.
//! Propagation stops at a fixed point or as soon as a domain would become empty.
//!
//! # Practical
//!
//! Implementing a propagator consists of two parts:
//! - A [`PropagatorConstructor`] which registers the scope of the propagator through the
//!   [`PropagatorConstructorContext`] and builds the propagator.
//! - The [`Propagator`] itself, which filters through a [`PropagationContextMut`] and undoes its
//!   own reversible state in [`Propagator::restore_before`].
//!
//! Propagators which are expensive relative to the others report a higher
//! [`FilteringComplexity`]; their calls are coalesced in auxiliary queues, so that a burst of
//! events on their scope results in one call per (propagator, last triggering variable).
mod constructor;
mod contexts;
mod local_id;
mod propagator;
mod propagator_id;

pub use constructor::*;
pub use contexts::*;
pub use local_id::*;
pub use propagator::*;
pub use propagator_id::PropagatorId;
pub(crate) use propagator_id::PropagatorVarId;
