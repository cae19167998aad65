/// A set of tuple positions stored as words of 64 bits, bit `i % 64` of word `i / 64` standing
/// for tuple `i`.
///
/// Long masks which are mostly one repeated word (all zeroes or all ones) are stored as that
/// default word plus the few words deviating from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mask {
    Dense(Box<[u64]>),
    Compressed {
        default: u64,
        /// `(offset, word)` pairs sorted by offset.
        exceptions: Box<[(u32, u64)]>,
    },
}

impl Mask {
    /// Compresses `words` if they are longer than `trigger` words and at most `limit` of them
    /// differ from either all zeroes or all ones.
    pub(crate) fn new(words: Box<[u64]>, trigger: usize, limit: usize) -> Mask {
        if words.len() <= trigger {
            return Mask::Dense(words);
        }

        let zeroes = words.iter().filter(|&&word| word != 0).count();
        let ones = words.iter().filter(|&&word| word != u64::MAX).count();
        let (default, num_exceptions) = if zeroes <= ones {
            (0, zeroes)
        } else {
            (u64::MAX, ones)
        };
        if num_exceptions > limit {
            return Mask::Dense(words);
        }

        let exceptions = words
            .iter()
            .enumerate()
            .filter(|&(_, &word)| word != default)
            .map(|(offset, &word)| (offset as u32, word))
            .collect();
        Mask::Compressed {
            default,
            exceptions,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, Mask::Compressed { .. })
    }

    pub fn word(&self, index: usize) -> u64 {
        match self {
            Mask::Dense(words) => words[index],
            Mask::Compressed {
                default,
                exceptions,
            } => exceptions
                .binary_search_by_key(&(index as u32), |&(offset, _)| offset)
                .map_or(*default, |position| exceptions[position].1),
        }
    }

    /// Sets `target[i] |= word(i)` for every word.
    pub(crate) fn or_into(&self, target: &mut [u64]) {
        self.combine_into(target, |word| word);
    }

    /// Sets `target[i] |= !word(i)` for every word.
    pub(crate) fn or_inverse_into(&self, target: &mut [u64]) {
        self.combine_into(target, |word| !word);
    }

    fn combine_into(&self, target: &mut [u64], transform: impl Fn(u64) -> u64) {
        match self {
            Mask::Dense(words) => {
                for (target, &word) in target.iter_mut().zip(words.iter()) {
                    *target |= transform(word);
                }
            }
            Mask::Compressed {
                default,
                exceptions,
            } => {
                let mut exceptions = exceptions.iter().peekable();
                for (index, target) in target.iter_mut().enumerate() {
                    let word = match exceptions.next_if(|&&(offset, _)| offset as usize == index) {
                        Some(&(_, word)) => word,
                        None => *default,
                    };
                    *target |= transform(word);
                }
            }
        }
    }
}
