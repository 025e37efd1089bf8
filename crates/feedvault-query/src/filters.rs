// SPDX-License-Identifier: Apache-2.0

use feedvault_model::MonthKey;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewestFirst => "newest_first",
            Self::OldestFirst => "oldest_first",
        }
    }
}

/// What the reader asked to see. Every constraint is optional and absent
/// or blank values do not constrain; active constraints combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedCriteria {
    pub member_id: Option<String>,
    pub month: Option<MonthKey>,
    pub tag: Option<String>,
    pub hidden_label: Option<String>,
    pub search_text: Option<String>,
    pub sort: SortDirection,
}

impl FeedCriteria {
    #[must_use]
    pub fn with_member(mut self, member_id: impl Into<String>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    #[must_use]
    pub fn with_month(mut self, month: MonthKey) -> Self {
        self.month = Some(month);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_hidden_label(mut self, label: impl Into<String>) -> Self {
        self.hidden_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        active(&self.member_id).is_none()
            && self.month.is_none()
            && active(&self.tag).is_none()
            && active(&self.hidden_label).is_none()
            && active_search(&self.search_text).is_none()
    }
}

pub(crate) fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub(crate) fn active_search(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[must_use]
pub fn normalize_search_text(input: &str) -> String {
    // Search normalization policy: NFKC + Unicode lowercase.
    input.nfkc().collect::<String>().to_lowercase()
}
