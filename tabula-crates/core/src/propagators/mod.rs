//! Contains the table filtering algorithms.
//!
//! See [`crate::propagation`] for info on propagators and [`crate::extension`] for the structures
//! the relations are stored in.
mod compact_table;
mod decision_diagram;
mod extension;
mod table;

pub(crate) use compact_table::*;
pub(crate) use decision_diagram::*;
pub(crate) use extension::*;
pub(crate) use table::*;
