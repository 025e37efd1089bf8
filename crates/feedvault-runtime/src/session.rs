// SPDX-License-Identifier: Apache-2.0

use feedvault_model::{MemberDirectory, MonthKey, Post};
use feedvault_query::{FeedCriteria, FeedView, Pager};
use feedvault_store::AggregateStore;
use std::ops::Range;
use tracing::debug;

/// Single writer over the store, the active criteria, the filtered view
/// and the pager. Every mutation keeps the view in sync with the store.
#[derive(Debug, Clone)]
pub struct FeedSession {
    store: AggregateStore,
    criteria: FeedCriteria,
    view: FeedView,
    pager: Pager,
}

impl FeedSession {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            store: AggregateStore::new(),
            criteria: FeedCriteria::default(),
            view: FeedView::default(),
            pager: Pager::new(page_size),
        }
    }

    #[must_use]
    pub fn store(&self) -> &AggregateStore {
        &self.store
    }

    #[must_use]
    pub fn members(&self) -> &MemberDirectory {
        self.store.members()
    }

    #[must_use]
    pub fn criteria(&self) -> &FeedCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    #[must_use]
    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn install_members(&mut self, members: MemberDirectory) {
        self.store.install_members(members);
    }

    pub fn set_criteria(&mut self, criteria: FeedCriteria) {
        self.criteria = criteria;
        self.view = FeedView::build(self.store.posts(), &self.criteria);
        self.pager.reset(self.view.len());
        debug!(matched = self.view.len(), "criteria applied");
    }

    /// Tag chip: narrows to one tag and drops the other text-style filters.
    /// Sort direction and the hidden-label filter are kept.
    pub fn apply_tag(&mut self, tag: impl Into<String>) {
        let criteria = FeedCriteria {
            member_id: None,
            month: None,
            tag: Some(tag.into()),
            hidden_label: self.criteria.hidden_label.clone(),
            search_text: None,
            sort: self.criteria.sort,
        };
        self.set_criteria(criteria);
    }

    /// Reveals the next page, or `None` while a reveal is still being
    /// rendered or when the view is exhausted. Pair with [`Self::finish_more`].
    pub fn more(&mut self) -> Option<Range<usize>> {
        self.pager.more()
    }

    pub fn finish_more(&mut self) {
        self.pager.complete();
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&Post> {
        self.resolve(self.pager.visible_range())
    }

    /// Posts at view positions `range`, clamped to the view.
    #[must_use]
    pub fn resolve(&self, range: Range<usize>) -> Vec<&Post> {
        self.view.resolve(self.store.posts(), range)
    }

    /// The whole filtered view in display order.
    #[must_use]
    pub fn matched(&self) -> Vec<&Post> {
        self.resolve(0..self.view.len())
    }

    /// Merges a loaded batch under unchanged criteria. Returns the number of
    /// posts added.
    pub fn merge_batch(&mut self, batch: Vec<(MonthKey, Vec<Post>)>) -> usize {
        let mut added = 0;
        for (_, posts) in batch {
            added += self.store.merge(posts);
        }
        if added > 0 {
            self.refresh_view();
        }
        added
    }

    /// Returns the number of discarded posts.
    pub fn trim_to_latest_months(&mut self, n: usize) -> usize {
        let removed = self.store.trim_to_latest_months(n);
        if removed > 0 {
            self.view = FeedView::build(self.store.posts(), &self.criteria);
            self.pager.reset(self.view.len());
        }
        removed
    }

    #[must_use]
    pub fn distinct_months(&self) -> Vec<MonthKey> {
        self.store.distinct_months()
    }

    #[must_use]
    pub fn distinct_hidden_labels(&self) -> Vec<String> {
        self.store.distinct_hidden_labels()
    }

    fn refresh_view(&mut self) {
        self.view = FeedView::build(self.store.posts(), &self.criteria);
        self.pager.resize(self.view.len());
    }
}
