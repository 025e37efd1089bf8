// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const DEFAULT_PAGE_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLimitsError(pub String);

impl Display for PageLimitsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PageLimitsError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageLimits {
    pub page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 500,
        }
    }
}

impl PageLimits {
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PageLimitsError> {
        if self.page_size == 0 {
            return Err(PageLimitsError("page_size must be at least 1".to_string()));
        }
        if self.page_size > self.max_page_size {
            return Err(PageLimitsError(format!(
                "page_size {} exceeds max {}",
                self.page_size, self.max_page_size
            )));
        }
        Ok(())
    }
}
