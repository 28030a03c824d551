//! A quality-weighted majority vote.

use crate::consensus::Algorithm;
use crate::consensus::Contribution;
use crate::consensus::Result;
use crate::consensus::MAX_SCORE;
use crate::consensus::NO_CALL;
use crate::consensus::SYMBOLS;
use crate::consensus::symbol_index;
use crate::core::Direction;
use crate::read::Chemistry;

/// Calls the symbol whose contributions carry the highest summed quality.
///
/// Ties go to the symbol that comes first in [`SYMBOLS`]. Scores are capped at
/// [`MAX_SCORE`].
#[derive(Clone, Debug, Default)]
pub struct Majority {
    /// The summed quality per symbol.
    sums: [u32; SYMBOLS.len()],

    /// The number of contributions per symbol.
    counts: [usize; SYMBOLS.len()],
}

impl Majority {
    /// Gets the index of the winning symbol, if any contribution was made.
    fn winner(&self) -> Option<usize> {
        let mut winner: Option<usize> = None;

        for i in 0..SYMBOLS.len() {
            if self.counts[i] == 0 {
                continue;
            }

            match winner {
                Some(w) if self.sums[w] >= self.sums[i] => {}
                _ => winner = Some(i),
            }
        }

        winner
    }

    /// Gets the capped score for a symbol index.
    fn score(&self, index: usize) -> u8 {
        self.sums[index].min(u32::from(MAX_SCORE)) as u8
    }
}

impl Algorithm for Majority {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn add_base(
        &mut self,
        base: u8,
        quality: u8,
        strand: Direction,
        chemistry: Chemistry,
    ) -> Result<()> {
        let contribution = Contribution::try_new(base, strand, chemistry)?;

        self.sums[contribution.symbol] += u32::from(quality);
        self.counts[contribution.symbol] += 1;

        Ok(())
    }

    fn best_base(&self) -> u8 {
        self.winner().map(|i| SYMBOLS[i]).unwrap_or(NO_CALL)
    }

    fn best_score(&self) -> u8 {
        self.winner().map(|i| self.score(i)).unwrap_or_default()
    }

    fn score_for_base(&self, base: u8) -> Option<u8> {
        symbol_index(base).map(|i| self.score(i))
    }

    fn read_count(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_summed_quality_wins() -> Result<()> {
        let mut majority = Majority::default();

        majority.add_base(b'A', 30, Direction::Forward, Chemistry::Primer)?;
        majority.add_base(b'A', 20, Direction::Forward, Chemistry::Primer)?;
        majority.add_base(b'C', 40, Direction::Forward, Chemistry::Primer)?;

        assert_eq!(majority.best_base(), b'A');
        assert_eq!(majority.best_score(), 50);
        assert_eq!(majority.score_for_base(b'C'), Some(40));
        assert_eq!(majority.score_for_base(b'G'), Some(0));

        Ok(())
    }

    #[test]
    fn ties_go_to_the_first_symbol_in_scan_order() -> Result<()> {
        let mut majority = Majority::default();

        majority.add_base(b'*', 25, Direction::Forward, Chemistry::Primer)?;
        majority.add_base(b'T', 25, Direction::Reverse, Chemistry::Primer)?;
        majority.add_base(b'G', 25, Direction::Forward, Chemistry::Terminator)?;

        assert_eq!(majority.best_base(), b'G');

        Ok(())
    }

    #[test]
    fn scores_are_capped() -> Result<()> {
        let mut majority = Majority::default();

        for _ in 0..5 {
            majority.add_base(b't', 40, Direction::Forward, Chemistry::Primer)?;
        }

        assert_eq!(majority.best_base(), b'T');
        assert_eq!(majority.best_score(), MAX_SCORE);
        assert_eq!(majority.read_count(), 5);

        Ok(())
    }

    #[test]
    fn zero_quality_contributions_still_make_a_call() -> Result<()> {
        let mut majority = Majority::default();
        majority.add_base(b'C', 0, Direction::Forward, Chemistry::Primer)?;

        assert_eq!(majority.best_base(), b'C');
        assert_eq!(majority.best_score(), 0);

        Ok(())
    }
}
