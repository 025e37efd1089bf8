// SPDX-License-Identifier: Apache-2.0

use feedvault_model::{Member, MemberDirectory, MonthKey, Post};
use std::collections::BTreeSet;
use tracing::debug;

/// Every post loaded in this session plus the member directory.
///
/// Append-only apart from [`AggregateStore::trim_to_latest_months`]. After
/// any change in size each post's `load_index` equals its position.
#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    posts: Vec<Post>,
    members: MemberDirectory,
}

impl AggregateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_members(&mut self, members: MemberDirectory) {
        debug!(members = members.len(), "member directory installed");
        self.members = members;
    }

    #[must_use]
    pub fn members(&self) -> &MemberDirectory {
        &self.members
    }

    #[must_use]
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn post_at(&self, load_index: usize) -> Option<&Post> {
        self.posts.get(load_index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Appends `incoming` and re-stamps arrival order over the whole
    /// collection. Returns the number of appended posts.
    pub fn merge(&mut self, incoming: Vec<Post>) -> usize {
        let added = incoming.len();
        if added == 0 {
            return 0;
        }
        self.posts.extend(incoming);
        self.restamp();
        debug!(added, total = self.posts.len(), "posts merged");
        added
    }

    /// Keeps only posts from the `n` latest distinct months. Returns the
    /// number of discarded posts.
    pub fn trim_to_latest_months(&mut self, n: usize) -> usize {
        let keep: BTreeSet<MonthKey> = self.distinct_months().into_iter().take(n).collect();
        let before = self.posts.len();
        self.posts.retain(|p| keep.contains(&p.month()));
        let removed = before - self.posts.len();
        if removed > 0 {
            self.restamp();
        }
        debug!(retained_months = keep.len(), removed, total = self.posts.len(), "store trimmed");
        removed
    }

    #[must_use]
    pub fn loaded_months(&self) -> BTreeSet<MonthKey> {
        self.posts.iter().map(Post::month).collect()
    }

    /// Newest first.
    #[must_use]
    pub fn distinct_months(&self) -> Vec<MonthKey> {
        self.loaded_months().into_iter().rev().collect()
    }

    #[must_use]
    pub fn distinct_hidden_labels(&self) -> Vec<String> {
        let labels: BTreeSet<&str> = self
            .posts
            .iter()
            .flat_map(|p| p.hidden_labels())
            .collect();
        labels.into_iter().map(str::to_string).collect()
    }

    #[must_use]
    pub fn distinct_tags(&self) -> Vec<String> {
        let tags: BTreeSet<&str> = self
            .posts
            .iter()
            .flat_map(|p| p.tags().iter().map(String::as_str))
            .filter(|t| !t.is_empty())
            .collect();
        tags.into_iter().map(str::to_string).collect()
    }

    fn restamp(&mut self) {
        for (index, post) in self.posts.iter_mut().enumerate() {
            post.set_load_index(index);
        }
    }
}
