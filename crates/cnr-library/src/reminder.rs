//! "Rate the app" reminder scheduling

use crate::models::ReviewReminder;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Answer given to the review prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewAnswer {
    /// Opened the review page
    Yes,
    /// Dismissed; ask again later
    NotNow,
    /// Declined for good
    No,
    /// Declined but sent feedback
    MailFeedback,
}

impl ReviewReminder {
    /// Reminder scheduled on first start: one week out
    pub fn first(now: DateTime<Utc>) -> Self {
        Self::scheduled(now, 1)
    }

    fn scheduled(now: DateTime<Utc>, weeks: u32) -> Self {
        Self {
            date: now + Duration::weeks(i64::from(weeks)),
            period_week: weeks,
            complete: false,
        }
    }

    fn completed(now: DateTime<Utc>) -> Self {
        Self {
            date: now,
            period_week: 1,
            complete: true,
        }
    }

    /// Whether the prompt should be shown at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.complete && now >= self.date
    }

    /// Next reminder after the user answered the prompt
    ///
    /// "Not now" backs off from one week to two, then to four.
    pub fn after_answer(&self, answer: ReviewAnswer, now: DateTime<Utc>) -> Self {
        match answer {
            ReviewAnswer::Yes | ReviewAnswer::No => Self::completed(now),
            ReviewAnswer::NotNow if self.period_week == 1 => Self::scheduled(now, 2),
            ReviewAnswer::NotNow => Self::scheduled(now, 4),
            ReviewAnswer::MailFeedback => Self::scheduled(now, 12),
        }
    }
}
