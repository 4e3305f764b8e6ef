// models.rs
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

impl Question {
    /// True iff `published_at` lies in `(now - 24h, now]`.
    pub fn was_recently_published(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) < self.published_at && self.published_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub votes: i64,
}

/// A question together with its choices, as shown on the detail and results pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionDetail {
    pub question: Question,
    pub choices: Vec<Choice>,
}

impl QuestionDetail {
    pub fn total_votes(&self) -> i64 {
        self.choices.iter().map(|c| c.votes).sum()
    }
}

/// Vote form as posted by the detail page. `choice` is untrusted.
#[derive(Debug, Default, Deserialize)]
pub struct VoteForm {
    pub choice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub choice_id: Option<ChoiceId>,
}

/// Choice id as sent by JSON clients, either `3` or `"3"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChoiceId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceId::Number(id) => write!(f, "{id}"),
            ChoiceId::Text(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub choices: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_at(published_at: DateTime<Utc>) -> Question {
        Question {
            id: 1,
            text: "What's up?".to_string(),
            published_at,
        }
    }

    #[test]
    fn test_was_recently_published_with_future_question() {
        let now = Utc::now();
        let question = question_at(now + Duration::days(30));
        assert!(!question.was_recently_published(now));
    }

    #[test]
    fn test_was_recently_published_with_old_question() {
        let now = Utc::now();
        let question = question_at(now - Duration::days(1) - Duration::seconds(1));
        assert!(!question.was_recently_published(now));
    }

    #[test]
    fn test_was_recently_published_with_recent_question() {
        let now = Utc::now();
        let question =
            question_at(now - Duration::hours(23) - Duration::minutes(59) - Duration::seconds(59));
        assert!(question.was_recently_published(now));
    }

    #[test]
    fn test_was_recently_published_window_edges() {
        let now = Utc::now();
        assert!(question_at(now).was_recently_published(now));
        assert!(!question_at(now - Duration::days(1)).was_recently_published(now));
        assert!(!question_at(now + Duration::seconds(1)).was_recently_published(now));
    }

    #[test]
    fn test_choice_id_accepts_number_or_string() {
        let numeric: VoteRequest = serde_json::from_str(r#"{"choice_id": 3}"#).unwrap();
        assert_eq!(numeric.choice_id, Some(ChoiceId::Number(3)));
        assert_eq!(numeric.choice_id.unwrap().to_string(), "3");

        let text: VoteRequest = serde_json::from_str(r#"{"choice_id": "7"}"#).unwrap();
        assert_eq!(text.choice_id.unwrap().to_string(), "7");

        let missing: VoteRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.choice_id.is_none());
    }

    #[test]
    fn test_total_votes() {
        let detail = QuestionDetail {
            question: question_at(Utc::now()),
            choices: vec![
                Choice { id: 1, question_id: 1, text: "Not much".into(), votes: 3 },
                Choice { id: 2, question_id: 1, text: "The sky".into(), votes: 4 },
            ],
        };
        assert_eq!(detail.total_votes(), 7);
    }
}
