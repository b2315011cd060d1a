use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Width of the `title` column.
pub const MAX_TITLE_LEN: usize = 255;

/// Unix timestamp of `0001-01-01T00:00:00Z`, the zero value clients send for
/// an unset time. Deadlines at or before it count as missing.
const ZERO_TIME_SECS: i64 = -62_135_596_800;

/// Task entity - a to-do item owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new, incomplete task for `user_id` from a validated draft.
    pub fn new(user_id: Uuid, draft: TaskDraft) -> Result<Self, DomainError> {
        let (title, description, deadline) = draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            deadline,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the editable fields. The completion flag is left alone.
    pub fn apply(&mut self, draft: TaskDraft) -> Result<(), DomainError> {
        let (title, description, deadline) = draft.validate()?;
        self.title = title;
        self.description = description;
        self.deadline = deadline;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
        self.updated_at = Utc::now();
    }
}

/// Client-supplied fields for creating or replacing a task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskDraft {
    fn validate(self) -> Result<(String, Option<String>, DateTime<Utc>), DomainError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation("title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
        let deadline = self
            .deadline
            .filter(|d| d.timestamp() > ZERO_TIME_SECS)
            .ok_or_else(|| DomainError::Validation("deadline is required".to_string()))?;
        let description = self.description.filter(|d| !d.trim().is_empty());
        Ok((title, description, deadline))
    }
}

/// Selection applied on top of the owner scope when listing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    /// Deadline falls on the given UTC calendar day.
    DueOn(NaiveDate),
    /// Incomplete and past its deadline at `now`.
    Backlog { now: DateTime<Utc> },
}

impl TaskFilter {
    pub fn today() -> Self {
        TaskFilter::DueOn(Utc::now().date_naive())
    }

    pub fn backlog() -> Self {
        TaskFilter::Backlog { now: Utc::now() }
    }

    /// Half-open `[start, end)` bounds of a UTC calendar day.
    pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = date
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (start, end)
    }

    pub fn matches(&self, task: &Task) -> bool {
        match *self {
            TaskFilter::All => true,
            TaskFilter::DueOn(date) => {
                let (start, end) = Self::day_bounds(date);
                task.deadline >= start && task.deadline < end
            }
            TaskFilter::Backlog { now } => !task.completed && task.deadline < now,
        }
    }
}
