// SPDX-License-Identifier: Apache-2.0

use crate::filters::{active, active_search, normalize_search_text, FeedCriteria, SortDirection};
use feedvault_model::{MonthKey, Post};
use std::cmp::Ordering;
use std::ops::Range;

/// Criteria with blanks dropped and the search needle normalized once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMatcher<'c> {
    member_id: Option<&'c str>,
    month: Option<MonthKey>,
    tag: Option<&'c str>,
    hidden_label: Option<&'c str>,
    needle: Option<String>,
}

impl<'c> PostMatcher<'c> {
    #[must_use]
    pub fn compile(criteria: &'c FeedCriteria) -> Self {
        Self {
            member_id: active(&criteria.member_id),
            month: criteria.month,
            tag: active(&criteria.tag),
            hidden_label: active(&criteria.hidden_label),
            needle: active_search(&criteria.search_text).map(normalize_search_text),
        }
    }

    #[must_use]
    pub fn matches(&self, post: &Post) -> bool {
        if self.member_id.is_some_and(|id| post.member() != id) {
            return false;
        }
        if self.month.is_some_and(|m| post.month() != m) {
            return false;
        }
        if self.tag.is_some_and(|t| !post.has_tag(t)) {
            return false;
        }
        if self.hidden_label.is_some_and(|l| !post.has_hidden_label(l)) {
            return false;
        }
        match &self.needle {
            None => true,
            Some(needle) => {
                normalize_search_text(post.translation()).contains(needle.as_str())
                    || post
                        .original()
                        .is_some_and(|o| normalize_search_text(o).contains(needle.as_str()))
            }
        }
    }
}

/// Timestamp first, then arrival order; unparseable dates are lowest.
/// Newest-first reverses both keys so later arrivals lead among ties.
#[must_use]
pub fn compare_posts(a: &Post, b: &Post, sort: SortDirection) -> Ordering {
    let ascending = a
        .timestamp()
        .cmp(&b.timestamp())
        .then_with(|| a.load_index().cmp(&b.load_index()));
    match sort {
        SortDirection::OldestFirst => ascending,
        SortDirection::NewestFirst => ascending.reverse(),
    }
}

/// Filtered and sorted view over `posts`. Pure.
#[must_use]
pub fn filter_posts<'a>(posts: &'a [Post], criteria: &FeedCriteria) -> Vec<&'a Post> {
    let matcher = PostMatcher::compile(criteria);
    let mut out: Vec<&Post> = posts.iter().filter(|p| matcher.matches(p)).collect();
    out.sort_by(|a, b| compare_posts(a, b, criteria.sort));
    out
}

/// A filtered view stored as positions into the post collection, so it can
/// be kept alongside the collection it indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedView {
    positions: Vec<usize>,
}

impl FeedView {
    /// `posts` must be stamped so that `load_index` equals position.
    #[must_use]
    pub fn build(posts: &[Post], criteria: &FeedCriteria) -> Self {
        Self {
            positions: filter_posts(posts, criteria)
                .into_iter()
                .map(Post::load_index)
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Posts for `range`, clamped to the view.
    #[must_use]
    pub fn resolve<'a>(&self, posts: &'a [Post], range: Range<usize>) -> Vec<&'a Post> {
        let end = range.end.min(self.positions.len());
        let start = range.start.min(end);
        self.positions[start..end]
            .iter()
            .filter_map(|&i| posts.get(i))
            .collect()
    }
}
