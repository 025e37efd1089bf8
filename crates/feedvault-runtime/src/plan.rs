// SPDX-License-Identifier: Apache-2.0

use chrono::{Datelike, Utc};
use feedvault_model::{MonthKey, ValidationError};
use std::collections::{BTreeSet, VecDeque};

/// The calendar month the wall clock is in, in UTC.
pub fn current_month() -> Result<MonthKey, ValidationError> {
    let now = Utc::now();
    let year = u16::try_from(now.year())
        .map_err(|_| ValidationError(format!("year out of range: {}", now.year())))?;
    let month = u8::try_from(now.month())
        .map_err(|_| ValidationError(format!("month out of range: {}", now.month())))?;
    MonthKey::from_year_month(year, month)
}

/// Which months to fetch up front and which belong to back-fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    start: MonthKey,
    now: MonthKey,
    eager: Vec<MonthKey>,
}

impl LoadPlan {
    /// `eager` holds the `eager_window` most recent months ending at `now`,
    /// never earlier than `start`, ascending. A `now` before `start` yields
    /// an empty plan.
    #[must_use]
    pub fn build(start: MonthKey, now: MonthKey, eager_window: usize) -> Self {
        let all: Vec<MonthKey> = MonthKey::range(start, now).collect();
        let skip = all.len().saturating_sub(eager_window);
        Self {
            start,
            now,
            eager: all[skip..].to_vec(),
        }
    }

    #[must_use]
    pub fn start(&self) -> MonthKey {
        self.start
    }

    #[must_use]
    pub fn now(&self) -> MonthKey {
        self.now
    }

    #[must_use]
    pub fn eager(&self) -> &[MonthKey] {
        &self.eager
    }

    /// Every month in `start..=now` that is not in `settled`, newest first.
    #[must_use]
    pub fn backfill(&self, settled: &BTreeSet<MonthKey>) -> Vec<MonthKey> {
        let mut months: Vec<MonthKey> = MonthKey::range(self.start, self.now)
            .filter(|m| !settled.contains(m))
            .collect();
        months.reverse();
        months
    }

    /// Eager months that need no second fetch: either their posts survived
    /// the trim, or the shard was empty (missing, broken or zero records).
    #[must_use]
    pub fn settled_after_trim(
        &self,
        empty: &BTreeSet<MonthKey>,
        retained: &BTreeSet<MonthKey>,
    ) -> BTreeSet<MonthKey> {
        self.eager
            .iter()
            .filter(|m| empty.contains(m) || retained.contains(m))
            .copied()
            .collect()
    }
}

/// Back-fill months chunked into fixed-size batches, consumed in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillQueue {
    batches: VecDeque<Vec<MonthKey>>,
}

impl BackfillQueue {
    #[must_use]
    pub fn new(months: Vec<MonthKey>, batch_size: usize) -> Self {
        let batches = months
            .chunks(batch_size.max(1))
            .map(<[MonthKey]>::to_vec)
            .collect();
        Self { batches }
    }

    pub fn next_batch(&mut self) -> Option<Vec<MonthKey>> {
        self.batches.pop_front()
    }

    #[must_use]
    pub fn remaining_batches(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn remaining_months(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
