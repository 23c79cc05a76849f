//! Per-participant data: who the certificate is for and when they finished.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Label used when no display name can be found.
pub const DEFAULT_DISPLAY_NAME: &str = "Participant";

/// Long-form date layout, e.g. `January 05, 2025`.
pub const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantContext {
    #[serde(default)]
    pub display_name: String,
    pub completion_date: NaiveDate,
    /// Correlation id for log lines (participant or submission id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ParticipantContext {
    pub fn new(display_name: impl Into<String>, completion_date: NaiveDate) -> Self {
        Self {
            display_name: display_name.into(),
            completion_date,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// The name to print; blank names fall back to [`DEFAULT_DISPLAY_NAME`].
    pub fn resolved_name(&self) -> &str {
        match self.display_name.trim() {
            "" => DEFAULT_DISPLAY_NAME,
            name => name,
        }
    }

    pub fn formatted_date(&self) -> String {
        self.completion_date.format(DATE_FORMAT).to_string()
    }

    pub(crate) fn log_ref(&self) -> &str {
        self.reference.as_deref().unwrap_or("-")
    }
}

/// One answered survey question, as loaded by the survey collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswer {
    pub question_title: String,
    #[serde(default)]
    pub value_text: Option<String>,
}

impl SurveyAnswer {
    pub fn new(question_title: impl Into<String>, value_text: impl Into<String>) -> Self {
        Self {
            question_title: question_title.into(),
            value_text: Some(value_text.into()),
        }
    }
}

/// Question-title keywords that mark a "your name" question.
const NAME_KEYWORDS: [&str; 2] = ["name", "nama"];

/// Pick the name to print on a certificate.
///
/// The first answer to a question whose title mentions a name wins; then
/// the account name, then the email, then [`DEFAULT_DISPLAY_NAME`].
pub fn resolve_display_name(
    answers: &[SurveyAnswer],
    account_name: Option<&str>,
    email: Option<&str>,
) -> String {
    let from_answers = answers
        .iter()
        .filter(|a| {
            let title = a.question_title.to_lowercase();
            NAME_KEYWORDS.iter().any(|k| title.contains(k))
        })
        .filter_map(|a| a.value_text.as_deref().map(str::trim))
        .find(|v| !v.is_empty());

    from_answers
        .or_else(|| account_name.map(str::trim).filter(|n| !n.is_empty()))
        .or_else(|| email.map(str::trim).filter(|e| !e.is_empty()))
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn long_form_date_pads_day() {
        let p = ParticipantContext::new("Jane Doe", date(2025, 1, 5));
        assert_eq!(p.formatted_date(), "January 05, 2025");
        let p = ParticipantContext::new("Jane Doe", date(2024, 11, 23));
        assert_eq!(p.formatted_date(), "November 23, 2024");
    }

    #[test]
    fn blank_name_uses_default_label() {
        let p = ParticipantContext::new("   ", date(2025, 1, 5));
        assert_eq!(p.resolved_name(), "Participant");
        let p = ParticipantContext::new("  Ada  ", date(2025, 1, 5));
        assert_eq!(p.resolved_name(), "Ada");
    }

    #[test]
    fn name_question_beats_account_name() {
        let answers = vec![
            SurveyAnswer::new("Your age", "41"),
            SurveyAnswer::new("Nama Lengkap", "Budi Santoso"),
            SurveyAnswer::new("Full name", "Someone Else"),
        ];
        assert_eq!(
            resolve_display_name(&answers, Some("budi.s"), Some("budi@example.com")),
            "Budi Santoso"
        );
    }

    #[test]
    fn blank_name_answers_are_skipped() {
        let answers = vec![
            SurveyAnswer {
                question_title: "Name".into(),
                value_text: None,
            },
            SurveyAnswer::new("Your NAME please", "  "),
        ];
        assert_eq!(
            resolve_display_name(&answers, Some("Account Holder"), None),
            "Account Holder"
        );
    }

    #[test]
    fn falls_back_to_email_then_label() {
        assert_eq!(resolve_display_name(&[], None, Some("a@b.c")), "a@b.c");
        assert_eq!(resolve_display_name(&[], Some(""), None), "Participant");
    }
}
