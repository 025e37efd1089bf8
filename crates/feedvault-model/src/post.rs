// SPDX-License-Identifier: Apache-2.0

use crate::{MonthKey, PostTimestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub term: String,
    pub definition: String,
}

/// `hidden_label` is either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HiddenLabel {
    One(String),
    Many(Vec<String>),
}

impl HiddenLabel {
    /// Non-blank labels in source order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(label) => std::slice::from_ref(label),
            Self::Many(labels) => labels.as_slice(),
        };
        slice
            .iter()
            .map(String::as_str)
            .filter(|label| !label.trim().is_empty())
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels().any(|l| l == label)
    }
}

/// One record as it appears in a monthly shard file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub member: String,
    #[serde(default)]
    pub date: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_label: Option<HiddenLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

/// A shard record stamped with the month it was loaded from.
///
/// `load_index` is owned by the aggregate store and rewritten whenever the
/// collection changes size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    #[serde(flatten)]
    raw: RawPost,
    month: MonthKey,
    #[serde(rename = "loadIndex")]
    load_index: usize,
    #[serde(skip)]
    timestamp: Option<PostTimestamp>,
}

impl Post {
    #[must_use]
    pub fn stamp(raw: RawPost, month: MonthKey) -> Self {
        let timestamp = PostTimestamp::parse(&raw.date);
        Self {
            raw,
            month,
            load_index: 0,
            timestamp,
        }
    }

    #[must_use]
    pub fn raw(&self) -> &RawPost {
        &self.raw
    }

    #[must_use]
    pub fn member(&self) -> &str {
        &self.raw.member
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.raw.date
    }

    #[must_use]
    pub fn translation(&self) -> &str {
        &self.raw.translation
    }

    #[must_use]
    pub fn original(&self) -> Option<&str> {
        self.raw.original.as_deref()
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.raw.tags.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn hidden_label(&self) -> Option<&HiddenLabel> {
        self.raw.hidden_label.as_ref()
    }

    #[must_use]
    pub fn hidden_labels(&self) -> BTreeSet<&str> {
        self.raw
            .hidden_label
            .as_ref()
            .map(|h| h.labels().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_hidden_label(&self, label: &str) -> bool {
        self.raw
            .hidden_label
            .as_ref()
            .is_some_and(|h| h.contains(label))
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        self.raw.annotations.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub const fn month(&self) -> MonthKey {
        self.month
    }

    #[must_use]
    pub const fn load_index(&self) -> usize {
        self.load_index
    }

    /// `None` when `date` could not be parsed; such posts sort as oldest.
    #[must_use]
    pub const fn timestamp(&self) -> Option<PostTimestamp> {
        self.timestamp
    }

    pub fn set_load_index(&mut self, load_index: usize) {
        self.load_index = load_index;
    }
}
