//! Tables stored as one bitset per (variable, value) pair, for filtering with compact tables.
mod mask;

use log::debug;
pub use mask::Mask;

use super::IndexRelation;
use super::STAR;
use crate::tabula_assert_simple;

/// A positive relation in which tuple `i` is bit `i` of a sequence of words.
///
/// For every variable and value index there is a mask of the tuples compatible with that index;
/// a tuple with [`STAR`] at a position is compatible with every index there. When some tuple
/// contains [`STAR`], a second, strict, family of masks only contains the tuples listing the
/// index explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitsetTable {
    domain_sizes: Box<[usize]>,
    num_tuples: usize,
    num_words: usize,
    masks: Vec<Box<[Mask]>>,
    strict_masks: Option<Vec<Box<[Mask]>>>,
    last_word_mask: u64,
}

impl BitsetTable {
    /// Builds the masks of a positive `relation`, compressing masks longer than
    /// `compression_trigger` words which deviate from their default word in at most
    /// `compression_limit` words.
    pub(crate) fn new(
        relation: &IndexRelation,
        compression_trigger: usize,
        compression_limit: usize,
    ) -> BitsetTable {
        tabula_assert_simple!(relation.positive, "bitset tables list allowed tuples");

        let num_tuples = relation.tuples.len();
        let num_words = num_tuples.div_ceil(64);
        let starred = relation.is_starred();

        let empty_masks = || {
            relation
                .domain_sizes
                .iter()
                .map(|&size| vec![vec![0_u64; num_words]; size])
                .collect::<Vec<_>>()
        };
        let mut masks = empty_masks();
        let mut strict_masks = if starred { Some(empty_masks()) } else { None };

        for (position, tuple) in relation.tuples.iter().enumerate() {
            let (word, bit) = (position / 64, 1_u64 << (position % 64));
            for (variable, &index) in tuple.iter().enumerate() {
                if index == STAR {
                    for mask in masks[variable].iter_mut() {
                        mask[word] |= bit;
                    }
                } else {
                    masks[variable][index][word] |= bit;
                    if let Some(strict_masks) = strict_masks.as_mut() {
                        strict_masks[variable][index][word] |= bit;
                    }
                }
            }
        }

        let finalize = |masks: Vec<Vec<Vec<u64>>>| {
            masks
                .into_iter()
                .map(|masks| {
                    masks
                        .into_iter()
                        .map(|words| {
                            Mask::new(words.into(), compression_trigger, compression_limit)
                        })
                        .collect::<Box<[Mask]>>()
                })
                .collect::<Vec<_>>()
        };

        let last_word_mask = match num_tuples % 64 {
            0 => u64::MAX,
            remainder => (1_u64 << remainder) - 1,
        };

        let table = BitsetTable {
            domain_sizes: relation.domain_sizes.clone().into(),
            num_tuples,
            num_words,
            masks: finalize(masks),
            strict_masks: strict_masks.map(finalize),
            last_word_mask,
        };

        let compressed = table.num_compressed_masks();
        if compressed > 0 {
            debug!(
                "compressed {compressed} masks of a bitset table with {num_words} words per mask"
            );
        }

        table
    }

    pub fn arity(&self) -> usize {
        self.domain_sizes.len()
    }

    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    pub fn num_tuples(&self) -> usize {
        self.num_tuples
    }

    pub fn num_words(&self) -> usize {
        self.num_words
    }

    pub fn is_starred(&self) -> bool {
        self.strict_masks.is_some()
    }

    /// The bits of the last word which correspond to tuples.
    pub fn last_word_mask(&self) -> u64 {
        self.last_word_mask
    }

    /// The tuples compatible with `index` for `variable`, starred tuples included.
    pub fn mask(&self, variable: usize, index: usize) -> &Mask {
        &self.masks[variable][index]
    }

    /// The tuples listing `index` for `variable` explicitly.
    pub fn strict_mask(&self, variable: usize, index: usize) -> &Mask {
        match &self.strict_masks {
            Some(strict_masks) => &strict_masks[variable][index],
            None => &self.masks[variable][index],
        }
    }

    pub fn num_compressed_masks(&self) -> usize {
        self.masks
            .iter()
            .chain(self.strict_masks.iter().flatten())
            .flat_map(|masks| masks.iter())
            .filter(|mask| mask.is_compressed())
            .count()
    }

    /// Whether the fully instantiated `tuple` is allowed.
    pub fn check_indexes(&self, tuple: &[usize]) -> bool {
        (0..self.num_words).any(|word| {
            tuple
                .iter()
                .enumerate()
                .fold(u64::MAX, |common, (variable, &index)| {
                    common & self.masks[variable][index].word(word)
                })
                != 0
        })
    }
}
