// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Feed archive model SSOT: months, members, posts and the guide document.

mod error;
mod guide;
mod member;
mod month;
mod post;
mod timestamp;

pub use error::ValidationError;
pub use guide::GuideDocument;
pub use member::{Member, MemberDirectory};
pub use month::{parse_month, MonthKey, MonthRange, MONTH_KEY_LEN};
pub use post::{Annotation, HiddenLabel, Post, RawPost};
pub use timestamp::PostTimestamp;

pub const CRATE_NAME: &str = "feedvault-model";
