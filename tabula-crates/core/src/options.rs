//! Options of the [`Solver`](crate::Solver) and of the table constraints it builds.
use std::fmt::Display;

/// Options used when constructing a [`Solver`](crate::Solver).
#[derive(Clone, Copy, Debug)]
pub struct SolverOptions {
    /// How table constraints are represented and filtered.
    pub extension: ExtensionOptions,
    /// Whether propagators with a non-cheap
    /// [`FilteringComplexity`](crate::propagation::FilteringComplexity) are deferred to
    /// auxiliary queues. When disabled, every propagator runs eagerly.
    pub use_auxiliary_queues: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            extension: ExtensionOptions::default(),
            use_auxiliary_queues: true,
        }
    }
}

/// Options for the representation of table constraints.
///
/// The backend choice only affects performance; every backend removes exactly the unsupported
/// values.
#[derive(Clone, Copy, Debug)]
pub struct ExtensionOptions {
    /// The backend used for relations listing allowed tuples.
    pub positive_backend: PositiveTableBackend,
    /// The backend used for relations listing forbidden tuples.
    pub negative_backend: NegativeTableBackend,
    /// Negative relations whose cartesian product has at most this many tuples are turned into
    /// positive relations under [`NegativeTableBackend::Automatic`].
    pub complement_limit: u64,
    /// Under [`PositiveTableBackend::Automatic`], relations with fewer tuples are filtered with
    /// STR2 rather than with a compact table.
    pub compact_table_min_tuples: usize,
    /// Under [`PositiveTableBackend::Automatic`], relations with at least this arity are
    /// compiled into a decision diagram.
    pub decision_diagram_min_arity: usize,
    /// Masks of a compact table are only considered for compression when they span more than
    /// this many words.
    pub mask_compression_trigger: usize,
    /// A mask is compressed when it deviates from its default word in at most this many words.
    pub mask_compression_limit: usize,
    /// Whether constraints with identical domains and relations share one structure.
    pub share_structures: bool,
}

impl Default for ExtensionOptions {
    fn default() -> Self {
        ExtensionOptions {
            positive_backend: PositiveTableBackend::default(),
            negative_backend: NegativeTableBackend::default(),
            complement_limit: 1000,
            compact_table_min_tuples: 64,
            decision_diagram_min_arity: 12,
            mask_compression_trigger: 300,
            mask_compression_limit: 12,
            share_structures: true,
        }
    }
}

/// The filtering algorithm for relations of allowed tuples.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PositiveTableBackend {
    /// Pick a backend based on the arity and the number of tuples.
    #[default]
    Automatic,
    /// Simple tabular reduction over the list of tuples.
    Str2,
    /// Bitset table with a backtracking journal of words.
    CompactTable,
    /// Reduced multi-valued decision diagram.
    DecisionDiagram,
}

impl Display for PositiveTableBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositiveTableBackend::Automatic => write!(f, "automatic"),
            PositiveTableBackend::Str2 => write!(f, "str2"),
            PositiveTableBackend::CompactTable => write!(f, "compact-table"),
            PositiveTableBackend::DecisionDiagram => write!(f, "decision-diagram"),
        }
    }
}

/// The filtering algorithm for relations of forbidden tuples.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum NegativeTableBackend {
    /// Complement small relations, count conflicts on the others.
    #[default]
    Automatic,
    /// Conflict counting over the list of forbidden tuples.
    Str2Negative,
    /// Always complement the relation and use the positive backend.
    Complement,
}

impl Display for NegativeTableBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegativeTableBackend::Automatic => write!(f, "automatic"),
            NegativeTableBackend::Str2Negative => write!(f, "str2-negative"),
            NegativeTableBackend::Complement => write!(f, "complement"),
        }
    }
}
