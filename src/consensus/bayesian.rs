//! A Bayesian consensus model.
//!
//! Contributions are grouped by symbol and by strand and chemistry category.
//! Every populated group is one independent event: its best quality, raised
//! by a bonus for concordant repeats, becomes an error probability `p`. The
//! observed symbol is supported with `1 - p` and every other hypothesis with
//! `p / 4`. Events multiply per hypothesis (summed in log space) and the
//! result is normalized into a posterior over the five symbols.

use crate::consensus::symbol_index;
use crate::consensus::Algorithm;
use crate::consensus::Contribution;
use crate::consensus::Result;
use crate::consensus::MAX_SCORE;
use crate::consensus::NO_CALL;
use crate::consensus::SYMBOLS;
use crate::core::Direction;
use crate::read::Chemistry;

/// The number of strand and chemistry categories.
const CATEGORIES: usize = 4;

/// The index of the pad in [`SYMBOLS`].
const PAD_INDEX: usize = 4;

/// The bonus added to a group's best quality, indexed by the number of
/// observations in the group (saturating at the last entry).
const CONCORDANCE_BONUS: [u8; 6] = [0, 0, 5, 8, 10, 11];

/// The smaller bonus used for groups of low-confidence pads.
const PAD_DISCOUNT: [u8; 6] = [0, 0, 1, 1, 2, 2];

/// Pads whose best quality falls below this are low confidence.
const LOW_CONFIDENCE_PAD: u8 = 15;

/// The error probability at which an observation carries no information
/// (`1 - p == p / 4`).
const UNINFORMATIVE: f64 = 0.8;

/// The observations of one symbol in one strand and chemistry category.
#[derive(Clone, Copy, Debug, Default)]
struct Group {
    /// The highest quality observed.
    best: u8,

    /// The number of observations.
    count: usize,
}

impl Group {
    /// Gets the error probability of the group as one event.
    fn error_probability(&self, is_pad: bool) -> f64 {
        let table = match is_pad && self.best < LOW_CONFIDENCE_PAD {
            true => &PAD_DISCOUNT,
            false => &CONCORDANCE_BONUS,
        };

        let bonus = table[self.count.min(table.len() - 1)];
        let score = self.best.saturating_add(bonus).min(MAX_SCORE);

        10f64.powf(-f64::from(score) / 10.0).min(UNINFORMATIVE)
    }
}

/// Calls the symbol with the highest posterior probability.
///
/// # Examples
///
/// ```
/// use contigmap::consensus::Algorithm as _;
/// use contigmap::consensus::Bayesian;
/// use contigmap::core::Direction;
/// use contigmap::read::Chemistry;
///
/// let mut bayesian = Bayesian::default();
///
/// // Ten weak pads on one strand cannot outvote two confident bases.
/// for _ in 0..10 {
///     bayesian.add_base(b'*', 10, Direction::Forward, Chemistry::Primer)?;
/// }
/// bayesian.add_base(b'A', 30, Direction::Forward, Chemistry::Primer)?;
/// bayesian.add_base(b'A', 30, Direction::Forward, Chemistry::Primer)?;
///
/// assert_eq!(bayesian.best_base(), b'A');
/// assert_eq!(bayesian.read_count(), 12);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Bayesian {
    /// The groups, indexed by symbol and then by category.
    groups: [[Group; CATEGORIES]; SYMBOLS.len()],

    /// The number of contributions since the last reset.
    count: usize,
}

impl Bayesian {
    /// Computes the posterior probability of every symbol, or `None` for an
    /// empty column.
    fn posteriors(&self) -> Option<[f64; SYMBOLS.len()]> {
        if self.count == 0 {
            return None;
        }

        let mut log_likelihoods = [0f64; SYMBOLS.len()];

        for (symbol, groups) in self.groups.iter().enumerate() {
            for group in groups.iter().filter(|group| group.count > 0) {
                let p = group.error_probability(symbol == PAD_INDEX);
                let (hit, miss) = ((1.0 - p).ln(), (p / 4.0).ln());

                for (hypothesis, log_likelihood) in log_likelihoods.iter_mut().enumerate() {
                    *log_likelihood += match hypothesis == symbol {
                        true => hit,
                        false => miss,
                    };
                }
            }
        }

        let max = log_likelihoods
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let weights = log_likelihoods.map(|l| (l - max).exp());
        let total = weights.iter().sum::<f64>();

        Some(weights.map(|w| w / total))
    }

    /// Gets the index of the most probable symbol (first in scan order on
    /// ties).
    fn winner(posteriors: &[f64; SYMBOLS.len()]) -> usize {
        let mut winner = 0;

        for (i, p) in posteriors.iter().enumerate().skip(1) {
            if *p > posteriors[winner] {
                winner = i;
            }
        }

        winner
    }

    /// Turns the posterior of a symbol into a phred-scaled score.
    fn score(posteriors: &[f64; SYMBOLS.len()], index: usize) -> u8 {
        // Summing the rivals keeps precision when the posterior is near one.
        let error = posteriors
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p)
            .sum::<f64>();

        if error <= 0.0 {
            return MAX_SCORE;
        }

        (-10.0 * error.log10())
            .round()
            .clamp(0.0, f64::from(MAX_SCORE)) as u8
    }
}

impl Algorithm for Bayesian {
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

        let group = &mut self.groups[contribution.symbol][contribution.category];
        group.best = group.best.max(quality);
        group.count += 1;

        self.count += 1;

        Ok(())
    }

    fn best_base(&self) -> u8 {
        self.posteriors()
            .map(|posteriors| SYMBOLS[Self::winner(&posteriors)])
            .unwrap_or(NO_CALL)
    }

    fn best_score(&self) -> u8 {
        self.posteriors()
            .map(|posteriors| Self::score(&posteriors, Self::winner(&posteriors)))
            .unwrap_or_default()
    }

    fn score_for_base(&self, base: u8) -> Option<u8> {
        let index = symbol_index(base)?;

        Some(
            self.posteriors()
                .map(|posteriors| Self::score(&posteriors, index))
                .unwrap_or_default(),
        )
    }

    fn read_count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_single_observation_keeps_its_quality() -> Result<()> {
        let mut bayesian = Bayesian::default();
        bayesian.add_base(b'G', 30, Direction::Forward, Chemistry::Primer)?;

        assert_eq!(bayesian.best_base(), b'G');
        assert_eq!(bayesian.best_score(), 30);
        assert_eq!(bayesian.score_for_base(b'C'), Some(0));

        Ok(())
    }

    #[test]
    fn concordant_repeats_earn_a_bonus() -> Result<()> {
        let mut bayesian = Bayesian::default();
        bayesian.add_base(b'A', 30, Direction::Forward, Chemistry::Primer)?;
        bayesian.add_base(b'A', 20, Direction::Forward, Chemistry::Primer)?;

        assert_eq!(bayesian.best_base(), b'A');
        assert_eq!(bayesian.best_score(), 35);

        Ok(())
    }

    #[test]
    fn independent_categories_reinforce_each_other() -> Result<()> {
        let mut bayesian = Bayesian::default();
        bayesian.add_base(b'T', 30, Direction::Forward, Chemistry::Primer)?;
        bayesian.add_base(b'T', 30, Direction::Reverse, Chemistry::Terminator)?;

        assert_eq!(bayesian.best_base(), b'T');
        assert!(bayesian.best_score() > 60);

        for _ in 0..4 {
            bayesian.add_base(b'T', 60, Direction::Forward, Chemistry::Terminator)?;
            bayesian.add_base(b'T', 60, Direction::Reverse, Chemistry::Primer)?;
        }

        assert_eq!(bayesian.best_score(), MAX_SCORE);

        Ok(())
    }

    #[test]
    fn weak_pads_do_not_outvote_confident_bases() -> Result<()> {
        let mut bayesian = Bayesian::default();

        for _ in 0..10 {
            bayesian.add_base(b'*', 10, Direction::Forward, Chemistry::Primer)?;
        }

        bayesian.add_base(b'A', 30, Direction::Forward, Chemistry::Primer)?;
        bayesian.add_base(b'A', 30, Direction::Forward, Chemistry::Primer)?;

        assert_eq!(bayesian.best_base(), b'A');
        assert!(bayesian.score_for_base(b'A') > bayesian.score_for_base(b'*'));

        Ok(())
    }

    #[test]
    fn confident_disagreement_favors_the_higher_quality() -> Result<()> {
        let mut bayesian = Bayesian::default();
        bayesian.add_base(b'C', 20, Direction::Forward, Chemistry::Primer)?;
        bayesian.add_base(b'G', 40, Direction::Reverse, Chemistry::Primer)?;

        assert_eq!(bayesian.best_base(), b'G');

        Ok(())
    }

    #[test]
    fn zero_quality_observations_carry_no_information() -> Result<()> {
        let mut bayesian = Bayesian::default();

        for base in SYMBOLS {
            bayesian.add_base(base, 0, Direction::Forward, Chemistry::Primer)?;
        }

        assert_eq!(bayesian.read_count(), 5);
        assert_eq!(bayesian.best_score(), 1);
        assert_eq!(bayesian.score_for_base(b'T'), Some(1));

        Ok(())
    }
}
