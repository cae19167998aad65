//! Filtering over the list of tuples of a [`Table`](crate::extension::Table).
mod str2;
mod str2_negative;

pub(crate) use str2::*;
pub(crate) use str2_negative::*;
