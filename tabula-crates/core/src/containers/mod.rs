//! Containers shared by the engine and the filters: typed vectors and reversible sets.
mod keyed_vec;
mod reversible_set;

use fnv::FnvBuildHasher;
pub use keyed_vec::*;
pub use reversible_set::*;

/// A [`std::collections::HashMap`] with the fnv hasher, so iteration order is reproducible
/// between runs.
#[allow(clippy::disallowed_types, reason = "the one place the std map is named")]
pub type HashMap<K, V, Hasher = FnvBuildHasher> = std::collections::HashMap<K, V, Hasher>;
/// A [`std::collections::HashSet`] with the fnv hasher.
#[allow(clippy::disallowed_types, reason = "the one place the std set is named")]
pub type HashSet<K, Hasher = FnvBuildHasher> = std::collections::HashSet<K, Hasher>;
