// SPDX-License-Identifier: Apache-2.0

use feedvault_model::{Member, MemberDirectory, MonthKey, Post};

/// Where visible posts go. The runtime calls it, it never calls back.
///
/// `reset` replaces everything shown so far, `append` adds a newly revealed
/// page. Posts whose author is unknown are passed through and it is up to
/// the renderer to skip them, see [`resolve_author`].
pub trait FeedRenderer {
    fn reset(&mut self, members: &MemberDirectory, posts: &[&Post]);

    fn append(&mut self, members: &MemberDirectory, posts: &[&Post]);

    /// Navigation indexes were re-derived after the store grew or shrank.
    fn indexes_changed(&mut self, _months: &[MonthKey], _hidden_labels: &[String]) {}
}

#[must_use]
pub fn resolve_author<'a>(members: &'a MemberDirectory, post: &Post) -> Option<&'a Member> {
    members.get(post.member())
}

/// Renderer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl FeedRenderer for NullRenderer {
    fn reset(&mut self, _members: &MemberDirectory, _posts: &[&Post]) {}

    fn append(&mut self, _members: &MemberDirectory, _posts: &[&Post]) {}
}
