//! Question status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionStatus {
    /// Visible and awaiting an answer.
    Open,
    /// A moderator has responded.
    Answered,
    /// Held for moderator review before it becomes visible.
    UnderReview,
}

impl QuestionStatus {
    /// Check whether a question in this status may move to `next`.
    ///
    /// `Open -> Answered` is the happy path; `UnderReview` may precede
    /// either. Re-answering an answered question keeps it answered.
    pub fn can_transition_to(&self, next: QuestionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Answered)
                | (Self::UnderReview, Self::Open)
                | (Self::UnderReview, Self::Answered)
                | (Self::Answered, Self::Answered)
        )
    }

    /// Whether anyone in the tenant may see and upvote the question.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Open | Self::Answered)
    }

    /// Whether the question shows up in the moderation queue.
    pub fn needs_moderation(&self) -> bool {
        matches!(self, Self::Open | Self::UnderReview)
    }

    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Answered => "ANSWERED",
            Self::UnderReview => "UNDER_REVIEW",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuestionStatus {
    type Err = pulsestage_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "ANSWERED" => Ok(Self::Answered),
            "UNDER_REVIEW" => Ok(Self::UnderReview),
            _ => Err(pulsestage_core::AppError::validation(format!(
                "Invalid question status: '{s}'. Expected one of: OPEN, ANSWERED, UNDER_REVIEW"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answered_never_reopens() {
        assert!(QuestionStatus::Open.can_transition_to(QuestionStatus::Answered));
        assert!(QuestionStatus::UnderReview.can_transition_to(QuestionStatus::Open));
        assert!(!QuestionStatus::Answered.can_transition_to(QuestionStatus::Open));
        assert!(!QuestionStatus::Open.can_transition_to(QuestionStatus::UnderReview));
    }

    #[test]
    fn test_under_review_is_not_public() {
        assert!(QuestionStatus::Open.is_public());
        assert!(QuestionStatus::Answered.is_public());
        assert!(!QuestionStatus::UnderReview.is_public());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "under_review".parse::<QuestionStatus>().unwrap(),
            QuestionStatus::UnderReview
        );
        assert!("closed".parse::<QuestionStatus>().is_err());
    }
}
