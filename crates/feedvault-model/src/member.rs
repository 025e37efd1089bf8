// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(
        default,
        rename = "displayId",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_id: Option<String>,
}

/// Members keyed by id. Loaded once per session and never mutated after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDirectory {
    by_id: BTreeMap<String, Member>,
}

impl MemberDirectory {
    /// Later entries replace earlier ones with the same id.
    #[must_use]
    pub fn from_members(members: Vec<Member>) -> Self {
        let mut by_id = BTreeMap::new();
        for member in members {
            by_id.insert(member.id.clone(), member);
        }
        Self { by_id }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Member> {
        self.by_id.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.by_id.values()
    }
}
