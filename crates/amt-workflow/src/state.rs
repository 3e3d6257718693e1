//! # Assessment Types and Lifecycle States
//!
//! The state enum is a superset shared by all three assessment types. Each
//! type walks its own path through it (see [`crate::policy`]); a state that
//! is meaningful for exams (e.g. `FINAL_CHECK`) is simply unreachable for
//! coursework. Callers must not assume a global order over states.

use serde::{Deserialize, Serialize};

use amt_core::ValidationError;

/// The kind of assessment. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentType {
    /// Coursework.
    #[serde(rename = "CW")]
    Coursework,
    /// In-class test.
    Test,
    /// Formal examination. Requires an exam date.
    Exam,
}

impl AssessmentType {
    /// Every assessment type, in declaration order.
    pub const ALL: [AssessmentType; 3] = [Self::Coursework, Self::Test, Self::Exam];

    /// The canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coursework => "CW",
            Self::Test => "TEST",
            Self::Exam => "EXAM",
        }
    }

    /// Parse a canonical wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CW" => Some(Self::Coursework),
            "TEST" => Some(Self::Test),
            "EXAM" => Some(Self::Exam),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssessmentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::Unrecognized {
            kind: "assessment type",
            value: s.to_string(),
        })
    }
}

/// Lifecycle state of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentState {
    // Common prefix.
    /// Being written by the setter. Initial state for every type.
    Draft,
    /// Submitted by the setter for independent checking.
    ReadyForCheck,
    /// Checker has asked the setter for changes.
    ChangesRequired,

    // Coursework.
    /// Released to students.
    Released,
    /// Submission deadline has passed.
    DeadlinePassed,

    // Test.
    /// The test has been sat.
    TestTaken,

    // Exam.
    /// Exams officer is checking the paper.
    ExamOfficerCheck,
    /// Exams officer has asked for changes.
    ExamChangesRequired,
    /// Awaiting the external examiner's feedback.
    ExternalFeedback,
    /// Setter is responding to external feedback.
    SetterResponse,
    /// Exams officer's final check.
    FinalCheck,
    /// Sent to the exams office for printing.
    SentToPrinting,
    /// The exam has been sat.
    ExamTaken,

    // Common post-delivery states.
    /// Marking in progress (includes standardisation).
    Marking,
    /// Admin checking marks (exams only).
    AdminMarkCheck,
    /// Moderation complete.
    Moderated,
    /// Feedback returned to students (coursework).
    FeedbackReturned,
    /// Results returned to students (test).
    ResultsReturned,
    /// Formally approved.
    Approved,
    /// Marks published. Terminal for every type.
    Published,
}

impl AssessmentState {
    /// Every state, in declaration order.
    pub const ALL: [AssessmentState; 20] = [
        Self::Draft,
        Self::ReadyForCheck,
        Self::ChangesRequired,
        Self::Released,
        Self::DeadlinePassed,
        Self::TestTaken,
        Self::ExamOfficerCheck,
        Self::ExamChangesRequired,
        Self::ExternalFeedback,
        Self::SetterResponse,
        Self::FinalCheck,
        Self::SentToPrinting,
        Self::ExamTaken,
        Self::Marking,
        Self::AdminMarkCheck,
        Self::Moderated,
        Self::FeedbackReturned,
        Self::ResultsReturned,
        Self::Approved,
        Self::Published,
    ];

    /// The canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::ReadyForCheck => "READY_FOR_CHECK",
            Self::ChangesRequired => "CHANGES_REQUIRED",
            Self::Released => "RELEASED",
            Self::DeadlinePassed => "DEADLINE_PASSED",
            Self::TestTaken => "TEST_TAKEN",
            Self::ExamOfficerCheck => "EXAM_OFFICER_CHECK",
            Self::ExamChangesRequired => "EXAM_CHANGES_REQUIRED",
            Self::ExternalFeedback => "EXTERNAL_FEEDBACK",
            Self::SetterResponse => "SETTER_RESPONSE",
            Self::FinalCheck => "FINAL_CHECK",
            Self::SentToPrinting => "SENT_TO_PRINTING",
            Self::ExamTaken => "EXAM_TAKEN",
            Self::Marking => "MARKING",
            Self::AdminMarkCheck => "ADMIN_MARK_CHECK",
            Self::Moderated => "MODERATED",
            Self::FeedbackReturned => "FEEDBACK_RETURNED",
            Self::ResultsReturned => "RESULTS_RETURNED",
            Self::Approved => "APPROVED",
            Self::Published => "PUBLISHED",
        }
    }

    /// Parse a canonical wire name. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }

    /// Whether the state is terminal. Only `PUBLISHED` is.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published)
    }
}

impl std::fmt::Display for AssessmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssessmentState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ValidationError::Unrecognized {
            kind: "assessment state",
            value: s.to_string(),
        })
    }
}
