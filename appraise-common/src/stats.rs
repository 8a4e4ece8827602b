//! Task aggregation
//!
//! Read-side statistics computed over a [`TaskSnapshot`]: the task's items
//! with their edited flags and the results attached to each. Nothing here
//! touches storage; empty input yields `None` or zero, never an error.

use crate::db::models::{
    LucyResult, LucyRanking, QualityLabel, QualityResult, RankingResult, SystemSlot, Task,
};
use serde::Serialize;

/// Results recorded for one item
#[derive(Debug, Clone)]
pub struct ItemJudgments<R> {
    pub item_id: i64,
    pub edited: bool,
    pub results: Vec<R>,
}

/// A task with every item and result, read at one point in time
#[derive(Debug, Clone)]
pub struct TaskSnapshot<R> {
    pub task: Task,
    pub items: Vec<ItemJudgments<R>>,
}

/// Edited vs. total item counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStatus {
    pub edited: u64,
    pub total: u64,
}

impl TaskStatus {
    /// All items edited (vacuously true for an empty task)
    pub fn completed(&self) -> bool {
        self.edited == self.total
    }
}

/// Lucy label tallies in fixed output order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LucyDistribution {
    pub much_worse: u64,
    pub worse: u64,
    pub equal: u64,
    pub better: u64,
    pub much_better: u64,
    pub total: u64,
}

impl LucyDistribution {
    fn record(&mut self, label: LucyRanking) {
        let bucket = match label {
            LucyRanking::MuchWorse => &mut self.much_worse,
            LucyRanking::Worse => &mut self.worse,
            LucyRanking::Equal => &mut self.equal,
            LucyRanking::Better => &mut self.better,
            LucyRanking::MuchBetter => &mut self.much_better,
        };
        *bucket += 1;
        self.total += 1;
    }

    pub fn count(&self, label: LucyRanking) -> u64 {
        match label {
            LucyRanking::MuchWorse => self.much_worse,
            LucyRanking::Worse => self.worse,
            LucyRanking::Equal => self.equal,
            LucyRanking::Better => self.better,
            LucyRanking::MuchBetter => self.much_better,
        }
    }

    /// `(W++, W+, ==, B+, B++, total)`
    pub fn as_tuple(&self) -> (u64, u64, u64, u64, u64, u64) {
        (
            self.much_worse,
            self.worse,
            self.equal,
            self.better,
            self.much_better,
            self.total,
        )
    }
}

/// Count of one quality label and its share of edited items
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QualityShare {
    pub count: u64,
    pub percentage: f64,
}

impl<R> TaskSnapshot<R> {
    pub fn new(task: Task, items: Vec<ItemJudgments<R>>) -> Self {
        Self { task, items }
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus {
            edited: self.edited_count(),
            total: self.items.len() as u64,
        }
    }

    pub fn completed(&self) -> bool {
        self.status().completed()
    }

    fn edited_count(&self) -> u64 {
        self.items.iter().filter(|item| item.edited).count() as u64
    }

    fn edited_results(&self) -> impl Iterator<Item = &R> {
        self.items
            .iter()
            .filter(|item| item.edited)
            .flat_map(|item| item.results.iter())
    }

    fn all_results(&self) -> impl Iterator<Item = &R> {
        self.items.iter().flat_map(|item| item.results.iter())
    }
}

impl TaskSnapshot<RankingResult> {
    /// Average rank of one system slot over edited items
    ///
    /// The rank sum covers every result on an edited item; the divisor is the
    /// number of edited items.
    pub fn average_rank(&self, slot: SystemSlot) -> Option<f64> {
        let edited = self.edited_count();
        if edited == 0 {
            return None;
        }

        let rank_sum: u64 = self
            .edited_results()
            .map(|result| u64::from(result.rank(slot).get()))
            .sum();

        Some(rank_sum as f64 / edited as f64)
    }
}

impl TaskSnapshot<LucyResult> {
    /// Tally of every result label recorded for the task
    pub fn lucy_distribution(&self) -> LucyDistribution {
        self.all_results()
            .fold(LucyDistribution::default(), |mut dist, result| {
                dist.record(result.ranking);
                dist
            })
    }
}

impl TaskSnapshot<QualityResult> {
    /// Results on edited items carrying `label`, as count and percentage
    pub fn quality_breakdown(&self, label: QualityLabel) -> QualityShare {
        let edited = self.edited_count();
        if edited == 0 {
            return QualityShare::default();
        }

        let count = self
            .edited_results()
            .filter(|result| result.quality == label)
            .count() as u64;

        QualityShare {
            count,
            percentage: 100.0 * count as f64 / edited as f64,
        }
    }

    pub fn acceptable(&self) -> QualityShare {
        self.quality_breakdown(QualityLabel::Acceptable)
    }

    pub fn can_be_fixed(&self) -> QualityShare {
        self.quality_breakdown(QualityLabel::CanBeFixed)
    }

    pub fn none_of_both(&self) -> QualityShare {
        self.quality_breakdown(QualityLabel::NoneOfBoth)
    }

    /// Mean of the recorded durations on edited items, in seconds
    pub fn average_duration(&self) -> Option<f64> {
        let (sum, n) = self
            .edited_results()
            .filter_map(QualityResult::duration_in_seconds)
            .fold((0.0, 0u64), |(sum, n), secs| (sum + secs, n + 1));

        if n == 0 {
            return None;
        }
        Some(sum / n as f64)
    }
}
