// src/admin.rs
//! Question and choice lifecycle. The public pages only read; everything that
//! creates or removes records goes through here.
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{Choice, NewQuestion, Question, QuestionDetail};
use crate::poll;

pub async fn create_question(
    pool: &SqlitePool,
    text: &str,
    published_at: DateTime<Utc>,
) -> Result<Question> {
    let text = non_blank(text, "Question text")?;

    let result = sqlx::query("INSERT INTO questions (text, published_at) VALUES (?, ?)")
        .bind(text)
        .bind(published_at)
        .execute(pool)
        .await?;

    let question = Question {
        id: result.last_insert_rowid(),
        text: text.to_string(),
        published_at,
    };
    info!(question_id = question.id, "Created question");

    Ok(question)
}

pub async fn add_choice(pool: &SqlitePool, question_id: i64, text: &str) -> Result<Choice> {
    let text = non_blank(text, "Choice text")?;
    poll::find_question(pool, question_id).await?;

    let result = sqlx::query("INSERT INTO choices (question_id, text) VALUES (?, ?)")
        .bind(question_id)
        .bind(text)
        .execute(pool)
        .await?;

    Ok(Choice {
        id: result.last_insert_rowid(),
        question_id,
        text: text.to_string(),
        votes: 0,
    })
}

/// Creates a question and its choices in one transaction.
pub async fn create_poll(pool: &SqlitePool, new: &NewQuestion) -> Result<QuestionDetail> {
    let text = non_blank(&new.text, "Question text")?;
    let choice_texts = new
        .choices
        .iter()
        .map(|c| non_blank(c, "Choice text"))
        .collect::<Result<Vec<_>>>()?;
    let published_at = new.published_at.unwrap_or_else(Utc::now);

    let mut tx = pool.begin().await?;

    let question_id = sqlx::query("INSERT INTO questions (text, published_at) VALUES (?, ?)")
        .bind(text)
        .bind(published_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    let mut choices = Vec::with_capacity(choice_texts.len());
    for choice_text in choice_texts {
        let id = sqlx::query("INSERT INTO choices (question_id, text) VALUES (?, ?)")
            .bind(question_id)
            .bind(choice_text)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        choices.push(Choice {
            id,
            question_id,
            text: choice_text.to_string(),
            votes: 0,
        });
    }

    tx.commit().await?;
    info!(question_id, choices = choices.len(), "Created poll");

    Ok(QuestionDetail {
        question: Question {
            id: question_id,
            text: text.to_string(),
            published_at,
        },
        choices,
    })
}

/// Deletes a question; its choices go with it.
pub async fn delete_question(pool: &SqlitePool, question_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(question_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    info!(question_id, "Deleted question");
    Ok(())
}

fn non_blank<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(format!("{what} must not be empty")));
    }
    Ok(text)
}
