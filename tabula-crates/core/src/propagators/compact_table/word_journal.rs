use crate::basic_types::Depth;
use crate::basic_types::Trail;

/// Keeps the previous content of the words of a bitset which are overwritten during search, so
/// that the bitset can be restored exactly.
///
/// A word is saved at most once per depth; the stamps are invalidated on every restore so that a
/// word overwritten again after backtracking is saved again.
#[derive(Clone, Debug)]
pub(crate) struct WordJournal {
    trail: Trail<(u32, u64)>,
    /// The depth and generation at which each word was last saved.
    stamps: Box<[(Depth, u64)]>,
    generation: u64,
}

impl WordJournal {
    pub(crate) fn new(num_words: usize) -> WordJournal {
        WordJournal {
            trail: Trail::with_capacity(num_words),
            stamps: vec![(Depth::MAX, 0); num_words].into(),
            generation: 0,
        }
    }

    /// Saves `word` as the content of word `index` before it is changed at `depth`.
    pub(crate) fn save(&mut self, index: usize, word: u64, depth: Depth) {
        if self.stamps[index] == (depth, self.generation) {
            return;
        }

        self.trail.advance_to(depth);
        self.trail.push((index as u32, word));
        self.stamps[index] = (depth, self.generation);
    }

    /// Writes back into `words` every word saved at `depth` or deeper, most recent first.
    pub(crate) fn restore_before(&mut self, depth: Depth, words: &mut [u64]) {
        for (index, word) in self.trail.undo_from(depth) {
            words[index as usize] = word;
        }
        self.generation += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.trail.len()
    }
}

#[cfg(test)]
mod tests {
    use super::WordJournal;

    #[test]
    fn words_are_saved_once_per_depth() {
        let mut journal = WordJournal::new(2);
        journal.save(0, 0b111, 1);
        journal.save(0, 0b011, 1);
        journal.save(1, 0b101, 1);

        assert_eq!(journal.len(), 2);
    }

    #[test]
    fn restoring_writes_back_the_oldest_content() {
        let mut words = vec![0b111, 0b111];
        let mut journal = WordJournal::new(2);

        journal.save(0, words[0], 1);
        words[0] = 0b011;
        journal.save(0, words[0], 2);
        words[0] = 0b001;
        journal.save(1, words[1], 2);
        words[1] = 0;

        journal.restore_before(2, &mut words);
        assert_eq!(words, vec![0b011, 0b111]);

        journal.restore_before(1, &mut words);
        assert_eq!(words, vec![0b111, 0b111]);
        assert_eq!(journal.len(), 0);
    }

    #[test]
    fn words_are_saved_again_after_a_restore() {
        let mut words = vec![0b11];
        let mut journal = WordJournal::new(1);

        journal.save(0, words[0], 1);
        words[0] = 0b01;
        journal.restore_before(1, &mut words);

        journal.save(0, words[0], 1);
        words[0] = 0;
        journal.restore_before(1, &mut words);

        assert_eq!(words, vec![0b11]);
    }
}
