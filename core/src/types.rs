//! Shared primitive types used across the exchange core.

use serde::{Deserialize, Serialize};

/// A stable, unique identifier for a user account.
pub type UserId = String;

/// A stable, unique identifier for a survey.
pub type SurveyId = String;

/// A stable, unique identifier for a response (one user's fill of one survey).
pub type ResponseId = String;

/// A stable, unique identifier for an abuse report.
pub type ReportId = String;

/// Integer points. Balances never go negative; ledger deltas are signed.
pub type Points = i64;

/// A 1-based page request. Page size is clamped by the facade before it
/// reaches the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// First page with the given size.
    pub fn first(page_size: u32) -> Self {
        Self { page: 1, page_size }
    }

    /// Clamp page to >= 1 and page_size into [1, max].
    pub fn clamped(self, max_page_size: u32) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, max_page_size),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

/// One page of results plus the total row count for the query.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total,
        }
    }
}
