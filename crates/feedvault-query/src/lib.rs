// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod engine;
mod filters;
mod limits;
mod pager;

pub use engine::{compare_posts, filter_posts, FeedView, PostMatcher};
pub use filters::{normalize_search_text, FeedCriteria, SortDirection};
pub use limits::{PageLimits, PageLimitsError, DEFAULT_PAGE_SIZE};
pub use pager::{Pager, PagerState};

pub const CRATE_NAME: &str = "feedvault-query";
