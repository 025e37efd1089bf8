// SPDX-License-Identifier: Apache-2.0

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Idle,
    Loading,
}

/// Tracks how much of the current view has been handed to the renderer.
///
/// `more` reveals one page at a time and reports only the newly revealed
/// range. While a reveal is being rendered the pager is `Loading` and
/// further `more` calls are dropped, not queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    visible: usize,
    total: usize,
    state: PagerState,
}

impl Pager {
    /// A zero page size is treated as one.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            visible: 0,
            total: 0,
            state: PagerState::Idle,
        }
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn visible_count(&self) -> usize {
        self.visible
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub const fn state(&self) -> PagerState {
        self.state
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.visible >= self.total
    }

    #[must_use]
    pub const fn visible_range(&self) -> Range<usize> {
        0..self.visible
    }

    /// New criteria: back to the first page.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.visible = self.page_size.min(total);
        self.state = PagerState::Idle;
    }

    /// The view length changed under unchanged criteria. What is already
    /// visible stays visible; an underfilled first page is topped up.
    pub fn resize(&mut self, total: usize) {
        self.total = total;
        self.visible = self.visible.max(self.page_size).min(total);
    }

    pub fn more(&mut self) -> Option<Range<usize>> {
        if self.state == PagerState::Loading || self.is_exhausted() {
            return None;
        }
        let start = self.visible;
        let end = start.saturating_add(self.page_size).min(self.total);
        self.visible = end;
        self.state = PagerState::Loading;
        Some(start..end)
    }

    pub fn complete(&mut self) {
        self.state = PagerState::Idle;
    }
}
