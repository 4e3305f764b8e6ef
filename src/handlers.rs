// handlers.rs
use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use tracing::{debug, error, info};

use crate::admin;
use crate::error::{AppError, Result};
use crate::models::{NewQuestion, Question, QuestionDetail, VoteForm, VoteRequest};
use crate::poll;
use crate::state::AppState;
use crate::views;

/// What an HTML handler decided to show.
#[derive(Debug)]
pub enum Page {
    Rendered(String),
    Redirect(String),
    NotFound,
    ServerError,
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self {
            Page::Rendered(body) => Html(body).into_response(),
            Page::Redirect(location) => Redirect::to(&location).into_response(),
            Page::NotFound => (StatusCode::NOT_FOUND, Html(views::not_found_page())).into_response(),
            Page::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(views::server_error_page()),
            )
                .into_response(),
        }
    }
}

/// Folds the uniform "not visible" outcome into a 404 page and anything else
/// into a 500 page.
fn page_or_error(result: Result<Page>) -> Page {
    match result {
        Ok(page) => page,
        Err(AppError::NotFound) => Page::NotFound,
        Err(e) => {
            error!("{e}");
            Page::ServerError
        }
    }
}

type QuestionPath = std::result::Result<Path<i64>, PathRejection>;

/// An id that doesn't parse can't name a question.
fn question_id(path: QuestionPath) -> Result<i64> {
    path.map(|Path(id)| id).map_err(|rejection| {
        debug!("Unroutable question id: {rejection}");
        AppError::NotFound
    })
}

fn results_path(question_id: i64) -> String {
    format!("/polls/{question_id}/results")
}

pub async fn root() -> Redirect {
    Redirect::to("/polls")
}

/// Latest visible questions
pub async fn index(State(state): State<AppState>) -> Page {
    page_or_error(
        poll::visible_questions(&state.pool, Utc::now(), state.config.index_limit)
            .await
            .map(|questions| {
                debug!(count = questions.len(), "Rendering index");
                Page::Rendered(views::index_page(&questions))
            }),
    )
}

pub async fn detail(State(state): State<AppState>, path: QuestionPath) -> Page {
    page_or_error(detail_page(&state, path).await)
}

async fn detail_page(state: &AppState, path: QuestionPath) -> Result<Page> {
    let detail = poll::visible_question_detail(&state.pool, question_id(path)?, Utc::now()).await?;
    Ok(Page::Rendered(views::detail_page(&detail, None)))
}

pub async fn results(State(state): State<AppState>, path: QuestionPath) -> Page {
    page_or_error(results_page(&state, path).await)
}

async fn results_page(state: &AppState, path: QuestionPath) -> Result<Page> {
    let detail = poll::visible_question_detail(&state.pool, question_id(path)?, Utc::now()).await?;
    Ok(Page::Rendered(views::results_page(&detail)))
}

/// Vote from the detail form. Success redirects so a refresh can't post twice;
/// a bad choice redisplays the form with an error. A body that isn't a usable
/// form counts as no choice at all.
pub async fn vote(
    State(state): State<AppState>,
    path: QuestionPath,
    form: std::result::Result<Form<VoteForm>, FormRejection>,
) -> Page {
    let form = form.map(|Form(form)| form).unwrap_or_else(|rejection| {
        debug!("Unusable vote form: {rejection}");
        VoteForm::default()
    });

    page_or_error(vote_page(&state, path, form).await)
}

async fn vote_page(state: &AppState, path: QuestionPath, form: VoteForm) -> Result<Page> {
    let question_id = question_id(path)?;

    match poll::cast_vote(&state.pool, question_id, form.choice.as_deref()).await {
        Ok(()) => Ok(Page::Redirect(results_path(question_id))),
        Err(AppError::InvalidChoice) => {
            info!(question_id, "Rejected vote without a valid choice");
            let question = poll::find_question(&state.pool, question_id).await?;
            let detail = poll::question_detail(&state.pool, question).await?;
            Ok(Page::Rendered(views::detail_page(
                &detail,
                Some(views::NO_CHOICE_MESSAGE),
            )))
        }
        Err(e) => Err(e),
    }
}

pub async fn api_list_questions(State(state): State<AppState>) -> Result<Json<Vec<Question>>> {
    let questions = poll::visible_questions(&state.pool, Utc::now(), state.config.index_limit).await?;
    Ok(Json(questions))
}

pub async fn api_get_question(
    State(state): State<AppState>,
    path: QuestionPath,
) -> Result<Json<QuestionDetail>> {
    let detail = poll::visible_question_detail(&state.pool, question_id(path)?, Utc::now()).await?;
    Ok(Json(detail))
}

pub async fn api_vote(
    State(state): State<AppState>,
    path: QuestionPath,
    Json(request): Json<VoteRequest>,
) -> Result<Json<QuestionDetail>> {
    let question_id = question_id(path)?;
    let choice_id = request.choice_id.map(|id| id.to_string());
    poll::cast_vote(&state.pool, question_id, choice_id.as_deref()).await?;

    let question = poll::find_question(&state.pool, question_id).await?;
    Ok(Json(poll::question_detail(&state.pool, question).await?))
}

pub async fn api_create_question(
    State(state): State<AppState>,
    Json(new): Json<NewQuestion>,
) -> Result<(StatusCode, Json<QuestionDetail>)> {
    let detail = admin::create_poll(&state.pool, &new).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn api_delete_question(
    State(state): State<AppState>,
    path: QuestionPath,
) -> Result<StatusCode> {
    admin::delete_question(&state.pool, question_id(path)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
