//! Controlled vocabularies for project records
//!
//! Submissions arrive with free-form text for status, project type, and
//! semester. Everything is normalized through the lookup tables here before
//! it is written, so the stored columns only ever hold canonical values.

/// Review status with the allowed transition graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Draft,
    UnderReview,
    Approved,
    Reject,
}

impl ProjectStatus {
    /// Map free-form input to a canonical status; unrecognized text lands in review
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "draft" => ProjectStatus::Draft,
            "approved" | "approve" | "accepted" | "complete" | "completed" | "done" => {
                ProjectStatus::Approved
            }
            "reject" | "rejected" | "deny" | "denied" | "declined" => ProjectStatus::Reject,
            _ => ProjectStatus::UnderReview,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::UnderReview => "underreview",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Reject => "reject",
        }
    }

    /// Statuses reachable from this one, not counting same-state rewrites
    pub fn allowed_transitions(&self) -> &'static [ProjectStatus] {
        match self {
            ProjectStatus::Draft => &[ProjectStatus::UnderReview],
            ProjectStatus::UnderReview => &[ProjectStatus::Approved, ProjectStatus::Reject],
            ProjectStatus::Approved => &[],
            ProjectStatus::Reject => &[ProjectStatus::UnderReview],
        }
    }

    pub fn can_transition_to(&self, next: ProjectStatus) -> bool {
        *self == next || self.allowed_transitions().contains(&next)
    }
}

/// Project category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Academic,
    Competition,
    Service,
    Other,
}

impl ProjectType {
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "academic" => ProjectType::Academic,
            "competition" | "contest" => ProjectType::Competition,
            "service" => ProjectType::Service,
            _ => ProjectType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Academic => "academic",
            ProjectType::Competition => "competition",
            ProjectType::Service => "service",
            ProjectType::Other => "other",
        }
    }
}

/// Semesters are stored as 1 or 2; anything unrecognized falls back to 1
pub fn normalize_semester(raw: &str) -> i32 {
    match raw.trim().to_lowercase().as_str() {
        "2" | "second" => 2,
        _ => 1,
    }
}

/// The fixed set of assignable grade letters
pub const GRADE_LETTERS: &[&str] = &["A", "B+", "B", "C+", "C", "D+", "D", "F", "I", "W"];

/// Map input to its canonical grade letter, or `None` when it is not in the set
pub fn normalize_grade(raw: &str) -> Option<&'static str> {
    let wanted = raw.trim().to_uppercase();
    GRADE_LETTERS
        .iter()
        .find(|letter| **letter == wanted)
        .copied()
}
