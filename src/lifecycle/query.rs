//! Row query filters and pagination.

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::types::Observation;

/// Filters for an import's observations. All set filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    /// Case-insensitive substring of the series label.
    pub series: Option<String>,
    /// Inclusive lower bound on the stored date string.
    pub date_from: Option<String>,
    /// Inclusive upper bound on the stored date string.
    pub date_to: Option<String>,
}

impl RowFilter {
    pub fn matches(&self, obs: &Observation) -> bool {
        if let Some(needle) = self.series.as_deref() {
            if !obs.series.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(from) = self.date_from.as_deref() {
            if obs.date.as_str() < from {
                return false;
            }
        }
        if let Some(to) = self.date_to.as_deref() {
            if obs.date.as_str() > to {
                return false;
            }
        }
        true
    }
}

/// A row query as a caller sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowQuery {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page; `None` uses the service default.
    pub page_size: Option<usize>,
    #[serde(flatten)]
    pub filter: RowFilter,
}

impl Default for RowQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
            filter: RowFilter::default(),
        }
    }
}

impl RowQuery {
    pub fn page(page: usize) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.filter.series = Some(series.into());
        self
    }

    pub fn with_date_range(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.filter.date_from = from.map(str::to_string);
        self.filter.date_to = to.map(str::to_string);
        self
    }
}

/// Resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub page_size: usize,
    pub offset: usize,
}

impl PageWindow {
    /// Validate `page`/`page_size` and compute the offset. Oversized pages are clamped.
    pub fn resolve(
        page: usize,
        page_size: Option<usize>,
        default_page_size: usize,
        max_page_size: usize,
    ) -> ImportResult<Self> {
        if page == 0 {
            return Err(ImportError::InvalidQuery {
                message: "page must be >= 1".to_string(),
            });
        }
        let page_size = page_size.unwrap_or(default_page_size);
        if page_size == 0 {
            return Err(ImportError::InvalidQuery {
                message: "page_size must be >= 1".to_string(),
            });
        }
        let page_size = page_size.min(max_page_size.max(1));
        Ok(Self {
            page,
            page_size,
            offset: (page - 1).saturating_mul(page_size),
        })
    }
}

/// One page of observations plus the total matching the same filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowPage {
    pub data: Vec<Observation>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}
