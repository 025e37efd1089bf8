// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// `guide.json`: a titled list shown next to the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideDocument {
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
}
