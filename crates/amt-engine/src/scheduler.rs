//! # Exam Auto-Progress
//!
//! Moves exams from `SENT_TO_PRINTING` to `EXAM_TAKEN` once their exam
//! date has passed. Runs as the system actor through the ordinary
//! executor path, so it is subject to the policy graph and the version
//! check like everything else.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use amt_core::AssessmentId;
use amt_workflow::{AssessmentState, AssessmentType};

use crate::executor::{TransitionExecutor, TransitionRequest};
use crate::ledger::AssessmentLedger;

/// Display name recorded on auto-progress transitions.
pub const SYSTEM_ACTOR: &str = "System (Auto-progress)";

/// Note recorded on auto-progress transitions.
pub const AUTO_PROGRESS_NOTE: &str = "Automatically progressed after exam date";

/// The working day before `today`. A Saturday or Sunday rolls back to
/// Friday.
pub fn last_working_day(today: NaiveDate) -> NaiveDate {
    let yesterday = today - Duration::days(1);
    match yesterday.weekday() {
        Weekday::Sat => yesterday - Duration::days(1),
        Weekday::Sun => yesterday - Duration::days(2),
        _ => yesterday,
    }
}

/// Outcome of one auto-progress run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoProgressSummary {
    /// Exam date that was matched.
    pub exam_date: NaiveDate,
    pub progressed: Vec<AssessmentId>,
    /// Exams that matched but could not be moved, with the reason.
    pub skipped: Vec<(AssessmentId, String)>,
}

/// Progress every exam dated on the last working day before `today` that
/// is still in `SENT_TO_PRINTING`.
pub fn auto_progress_exams(
    ledger: &AssessmentLedger,
    executor: &TransitionExecutor,
    today: NaiveDate,
) -> AutoProgressSummary {
    let exam_date = last_working_day(today);
    let due = ledger.filter(|a| {
        a.assessment_type == AssessmentType::Exam
            && a.exam_date == Some(exam_date)
            && a.state == AssessmentState::SentToPrinting
    });

    let mut summary = AutoProgressSummary {
        exam_date,
        progressed: Vec::new(),
        skipped: Vec::new(),
    };

    for exam in due {
        let request = TransitionRequest::new(exam.id, AssessmentState::ExamTaken)
            .with_note(AUTO_PROGRESS_NOTE)
            .at_version(exam.version);
        match executor.progress_as_system(SYSTEM_ACTOR, request) {
            Ok(_) => summary.progressed.push(exam.id),
            Err(err) => {
                tracing::warn!(assessment_id = %exam.id, error = %err, "auto-progress skipped exam");
                summary.skipped.push((exam.id, err.to_string()));
            }
        }
    }

    tracing::info!(
        exam_date = %exam_date,
        progressed = summary.progressed.len(),
        skipped = summary.skipped.len(),
        "exam auto-progress run completed"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_rolls_back_one_day() {
        // Tuesday -> Monday
        assert_eq!(last_working_day(date(2026, 10, 20)), date(2026, 10, 19));
        // Saturday -> Friday
        assert_eq!(last_working_day(date(2026, 10, 17)), date(2026, 10, 16));
    }

    #[test]
    fn weekend_rolls_back_to_friday() {
        // Sunday: yesterday is Saturday
        assert_eq!(last_working_day(date(2026, 10, 18)), date(2026, 10, 16));
        // Monday: yesterday is Sunday
        assert_eq!(last_working_day(date(2026, 10, 19)), date(2026, 10, 16));
    }
}
