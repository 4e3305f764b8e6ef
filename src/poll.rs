// src/poll.rs
//! Read rules for questions and the vote increment.
//!
//! A question is *visible* when it was published at or before `now` and has
//! at least one choice. List, detail and results pages only ever see visible
//! questions; voting resolves the question without that filter.
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{Choice, Question, QuestionDetail};

/// Visible questions, newest first, at most `limit` of them.
pub async fn visible_questions(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT q.id, q.text, q.published_at
        FROM questions q
        WHERE q.published_at <= ?
          AND EXISTS (SELECT 1 FROM choices c WHERE c.question_id = q.id)
        ORDER BY q.published_at DESC, q.id ASC
        LIMIT ?
        "#,
    )
    .bind(now)
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;

    Ok(questions)
}

pub async fn visible_question_by_id(
    pool: &SqlitePool,
    question_id: i64,
    now: DateTime<Utc>,
) -> Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT q.id, q.text, q.published_at
        FROM questions q
        WHERE q.id = ?
          AND q.published_at <= ?
          AND EXISTS (SELECT 1 FROM choices c WHERE c.question_id = q.id)
        "#,
    )
    .bind(question_id)
    .bind(now)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Looks a question up by id regardless of visibility.
pub async fn find_question(pool: &SqlitePool, question_id: i64) -> Result<Question> {
    sqlx::query_as::<_, Question>("SELECT id, text, published_at FROM questions WHERE id = ?")
        .bind(question_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn question_detail(pool: &SqlitePool, question: Question) -> Result<QuestionDetail> {
    let choices = sqlx::query_as::<_, Choice>(
        "SELECT id, question_id, text, votes FROM choices WHERE question_id = ? ORDER BY id",
    )
    .bind(question.id)
    .fetch_all(pool)
    .await?;

    Ok(QuestionDetail { question, choices })
}

pub async fn visible_question_detail(
    pool: &SqlitePool,
    question_id: i64,
    now: DateTime<Utc>,
) -> Result<QuestionDetail> {
    let question = visible_question_by_id(pool, question_id, now).await?;
    question_detail(pool, question).await
}

/// Records one vote for `choice_id` on `question_id`.
///
/// `choice_id` comes straight from the client: a missing or non-numeric id,
/// or one that belongs to another question, is `InvalidChoice`. The count is
/// bumped in place by the database so concurrent votes are never lost.
pub async fn cast_vote(pool: &SqlitePool, question_id: i64, choice_id: Option<&str>) -> Result<()> {
    find_question(pool, question_id).await?;

    let choice_id = choice_id
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .ok_or(AppError::InvalidChoice)?;

    let result = sqlx::query("UPDATE choices SET votes = votes + 1 WHERE id = ? AND question_id = ?")
        .bind(choice_id)
        .bind(question_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InvalidChoice);
    }

    debug!(question_id, choice_id, "Vote recorded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::admin::{add_choice, create_question};
    use crate::db::test_pool;

    async fn create_poll_at(
        pool: &SqlitePool,
        text: &str,
        now: DateTime<Utc>,
        days: i64,
        choices: &[&str],
    ) -> QuestionDetail {
        let question = create_question(pool, text, now + Duration::days(days))
            .await
            .unwrap();
        let mut created = Vec::new();
        for choice in choices {
            created.push(add_choice(pool, question.id, choice).await.unwrap());
        }
        QuestionDetail {
            question,
            choices: created,
        }
    }

    async fn votes_of(pool: &SqlitePool) -> Vec<(i64, i64)> {
        sqlx::query_as("SELECT id, votes FROM choices ORDER BY id")
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_questions() {
        let pool = test_pool().await;
        let questions = visible_questions(&pool, Utc::now(), 5).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn test_past_question_is_listed() {
        let pool = test_pool().await;
        let now = Utc::now();
        let past = create_poll_at(&pool, "Past question", now, -30, &["Yes"]).await;

        let questions = visible_questions(&pool, now, 5).await.unwrap();
        assert_eq!(questions, vec![past.question]);
    }

    #[tokio::test]
    async fn test_future_question_is_hidden() {
        let pool = test_pool().await;
        let now = Utc::now();
        let past = create_poll_at(&pool, "Past question", now, -30, &["Yes"]).await;
        create_poll_at(&pool, "Future question", now, 30, &["Yes"]).await;

        let questions = visible_questions(&pool, now, 5).await.unwrap();
        assert_eq!(questions, vec![past.question]);
    }

    #[tokio::test]
    async fn test_question_without_choices_is_hidden() {
        let pool = test_pool().await;
        let now = Utc::now();
        create_poll_at(&pool, "Empty question", now, -1, &[]).await;

        let questions = visible_questions(&pool, now, 5).await.unwrap();
        assert!(questions.is_empty());
    }

    #[tokio::test]
    async fn test_two_past_questions_newest_first() {
        let pool = test_pool().await;
        let now = Utc::now();
        let older = create_poll_at(&pool, "Past question 1", now, -30, &["A"]).await;
        let newer = create_poll_at(&pool, "Past question 2", now, -10, &["A"]).await;

        let questions = visible_questions(&pool, now, 5).await.unwrap();
        assert_eq!(questions, vec![newer.question, older.question]);
    }

    #[tokio::test]
    async fn test_same_publish_time_keeps_insertion_order() {
        let pool = test_pool().await;
        let now = Utc::now();
        let first = create_poll_at(&pool, "First", now, -2, &["A"]).await;
        let second = create_question(&pool, "Second", first.question.published_at)
            .await
            .unwrap();
        add_choice(&pool, second.id, "A").await.unwrap();

        let questions = visible_questions(&pool, now, 5).await.unwrap();
        assert_eq!(questions, vec![first.question, second]);
    }

    #[tokio::test]
    async fn test_multiple_choices_listed_once() {
        let pool = test_pool().await;
        let now = Utc::now();
        create_poll_at(&pool, "Many choices", now, -1, &["A", "B", "C"]).await;

        let questions = visible_questions(&pool, now, 5).await.unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[tokio::test]
    async fn test_limit_is_honoured() {
        let pool = test_pool().await;
        let now = Utc::now();
        for day in 1..=7 {
            create_poll_at(&pool, &format!("Question {day}"), now, -day, &["A"]).await;
        }

        let questions = visible_questions(&pool, now, 5).await.unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].text, "Question 1");

        assert!(visible_questions(&pool, now, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_visible_question_by_id_not_found_cases() {
        let pool = test_pool().await;
        let now = Utc::now();
        let future = create_poll_at(&pool, "Future", now, 5, &["A"]).await;
        let empty = create_poll_at(&pool, "No choices", now, -5, &[]).await;

        for id in [999, future.question.id, empty.question.id] {
            let err = visible_question_by_id(&pool, id, now).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound), "id {id} should be hidden");
        }
    }

    #[tokio::test]
    async fn test_visible_question_detail() {
        let pool = test_pool().await;
        let now = Utc::now();
        let past = create_poll_at(&pool, "Past", now, -5, &["A", "B"]).await;

        let detail = visible_question_detail(&pool, past.question.id, now)
            .await
            .unwrap();
        assert_eq!(detail, past);
    }

    #[tokio::test]
    async fn test_vote_increments_only_selected_choice() {
        let pool = test_pool().await;
        let now = Utc::now();
        let poll = create_poll_at(&pool, "Q", now, -1, &["A", "B"]).await;
        let (a, b) = (poll.choices[0].id, poll.choices[1].id);

        cast_vote(&pool, poll.question.id, Some(&a.to_string()))
            .await
            .unwrap();
        assert_eq!(votes_of(&pool).await, vec![(a, 1), (b, 0)]);

        cast_vote(&pool, poll.question.id, Some(&a.to_string()))
            .await
            .unwrap();
        assert_eq!(votes_of(&pool).await, vec![(a, 2), (b, 0)]);
    }

    #[tokio::test]
    async fn test_vote_with_missing_or_malformed_choice() {
        let pool = test_pool().await;
        let now = Utc::now();
        let poll = create_poll_at(&pool, "Q", now, -1, &["A"]).await;

        for choice in [None, Some(""), Some("abc")] {
            let err = cast_vote(&pool, poll.question.id, choice).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidChoice));
        }
        assert_eq!(votes_of(&pool).await, vec![(poll.choices[0].id, 0)]);
    }

    #[tokio::test]
    async fn test_vote_with_choice_from_other_question() {
        let pool = test_pool().await;
        let now = Utc::now();
        let first = create_poll_at(&pool, "First", now, -1, &["A"]).await;
        let second = create_poll_at(&pool, "Second", now, -1, &["B"]).await;

        let foreign = second.choices[0].id.to_string();
        let err = cast_vote(&pool, first.question.id, Some(&foreign))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidChoice));
        assert!(votes_of(&pool).await.iter().all(|(_, votes)| *votes == 0));
    }

    #[tokio::test]
    async fn test_vote_on_unknown_question() {
        let pool = test_pool().await;
        let err = cast_vote(&pool, 7, Some("1")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_vote_on_unpublished_question_is_accepted() {
        let pool = test_pool().await;
        let now = Utc::now();
        let future = create_poll_at(&pool, "Future", now, 3, &["A"]).await;

        cast_vote(&pool, future.question.id, Some(&future.choices[0].id.to_string()))
            .await
            .unwrap();
        assert_eq!(votes_of(&pool).await, vec![(future.choices[0].id, 1)]);
    }
}
