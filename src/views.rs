// src/views.rs
//! HTML pages for the poll site.
use crate::models::{Question, QuestionDetail};

pub const NO_POLLS_MESSAGE: &str = "No polls are available currently.";
pub const NO_CHOICE_MESSAGE: &str = "You didn't select a choice.";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

pub fn index_page(questions: &[Question]) -> String {
    let mut body = String::from("<h1>Polls</h1>\n");

    if questions.is_empty() {
        body.push_str(&format!("<p>{NO_POLLS_MESSAGE}</p>\n"));
    } else {
        body.push_str("<ul>\n");
        for question in questions {
            body.push_str(&format!(
                "<li><a href=\"/polls/{}\">{}</a></li>\n",
                question.id,
                escape(&question.text)
            ));
        }
        body.push_str("</ul>\n");
    }

    layout("Polls", &body)
}

/// The voting form, optionally with the message from a rejected vote.
pub fn detail_page(detail: &QuestionDetail, error_message: Option<&str>) -> String {
    let question = &detail.question;
    let mut body = format!(
        "<form action=\"/polls/{}/vote\" method=\"post\">\n<fieldset>\n<legend><h1>{}</h1></legend>\n",
        question.id,
        escape(&question.text)
    );

    if let Some(message) = error_message {
        body.push_str(&format!("<p><strong>{}</strong></p>\n", escape(message)));
    }
    for choice in &detail.choices {
        body.push_str(&format!(
            "<input type=\"radio\" name=\"choice\" id=\"choice{id}\" value=\"{id}\">\n<label for=\"choice{id}\">{}</label><br>\n",
            escape(&choice.text),
            id = choice.id
        ));
    }
    body.push_str("</fieldset>\n<input type=\"submit\" value=\"Vote\">\n</form>\n");

    layout(&question.text, &body)
}

pub fn results_page(detail: &QuestionDetail) -> String {
    let question = &detail.question;
    let mut body = format!("<h1>{}</h1>\n<ul>\n", escape(&question.text));

    for choice in &detail.choices {
        body.push_str(&format!(
            "<li>{} -- {} vote{}</li>\n",
            escape(&choice.text),
            choice.votes,
            if choice.votes == 1 { "" } else { "s" }
        ));
    }
    body.push_str(&format!(
        "</ul>\n<p>Total votes: {}</p>\n<a href=\"/polls/{}\">Vote again?</a>\n",
        detail.total_votes(),
        question.id
    ));

    layout(&question.text, &body)
}

pub fn not_found_page() -> String {
    layout("Not found", "<h1>Not found</h1>\n<p>No such poll.</p>\n")
}

pub fn server_error_page() -> String {
    layout(
        "Server error",
        "<h1>Server error</h1>\n<p>Something went wrong, please try again later.</p>\n",
    )
}

/// Escapes text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
