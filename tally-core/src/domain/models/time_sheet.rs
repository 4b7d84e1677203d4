use time::Date;

use super::{TimePeriodId, TimeSheetId, UserId};

/// Approval state of a time sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApprovalStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Draft => write!(f, "Draft"),
            ApprovalStatus::Submitted => write!(f, "Submitted"),
            ApprovalStatus::Approved => write!(f, "Approved"),
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ApprovalStatus::Draft),
            "submitted" => Ok(ApprovalStatus::Submitted),
            "approved" => Ok(ApprovalStatus::Approved),
            _ => Err(format!("Unknown approval status: {}", s)),
        }
    }
}

/// A billing period. Time entries always land on a sheet scoped to the
/// currently open period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePeriod {
    pub id: TimePeriodId,
    pub start_date: Date,
    pub end_date: Date,
}

impl TimePeriod {
    pub fn new(id: impl Into<TimePeriodId>, start_date: Date, end_date: Date) -> Self {
        Self {
            id: id.into(),
            start_date,
            end_date,
        }
    }
}

/// A time sheet for one user in one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSheet {
    pub id: TimeSheetId,
    pub user_id: UserId,
    pub period_id: TimePeriodId,
    pub approval_status: ApprovalStatus,
}

impl TimeSheet {
    pub fn new(
        id: impl Into<TimeSheetId>,
        user_id: impl Into<UserId>,
        period_id: impl Into<TimePeriodId>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            period_id: period_id.into(),
            approval_status: ApprovalStatus::Draft,
        }
    }

    pub fn with_approval_status(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = status;
        self
    }
}
