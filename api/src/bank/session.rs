use std::sync::LazyLock;

use regex::Regex;

use crate::{
    App,
    error::{AppError, RequestError},
    identity::models::identity::Identity,
    params::{Params, clean_bool},
};

use super::{Behaviour, NewPracticeSession, view::BankView};

static QUESTION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^q(\d+)$").expect("question field pattern is valid"));

/// Question ids picked in the list, from the form fields `q<id>` with a truthy
/// value. Submission order is kept and repeated ids are dropped.
pub fn selected_questions(params: &Params) -> Result<Vec<i32>, RequestError> {
    let mut selected = vec![];
    for (key, value) in params.iter() {
        let Some(captures) = QUESTION_FIELD.captures(key) else {
            continue;
        };

        if !clean_bool(value) {
            continue;
        }

        let id: i32 = captures[1]
            .parse()
            .map_err(|_| RequestError::invalid(format!("`{key}` is not a question id")))?;
        if !selected.contains(&id) {
            selected.push(id);
        }
    }
    Ok(selected)
}

fn guard_key(identity_id: i32, bank: &BankView, selected: &[i32]) -> String {
    let mut ids = selected.to_vec();
    ids.sort_unstable();
    format!(
        "{identity_id}:{}:{}:{ids:?}",
        bank.module.id, bank.category.id
    )
}

/// Creates a practice session over the selected questions and returns its
/// id. The same submission repeated within the guard window returns the
/// session created first.
pub async fn start_quiz(
    ctx: &App,
    identity: &Identity,
    bank: &BankView,
    selected: &[i32],
) -> Result<i32, AppError> {
    if !selected.is_empty() {
        let found = ctx.bank.questions_in_scope(&bank.scope, selected).await?;
        if let Some(missing) = selected.iter().find(|id| !found.contains(id)) {
            return Err(RequestError::invalid(format!(
                "question {missing} is not part of this question bank"
            ))
            .into());
        }
    }

    let key = guard_key(identity.id, bank, selected);
    let existing = ctx.start_quiz_guard.get(&key).await.map(|id| *id);
    if let Some(session_id) = existing {
        tracing::info!(
            session_id,
            identity_id = identity.id,
            "duplicate start quiz submission, reusing session"
        );
        return Ok(session_id);
    }

    let session = NewPracticeSession {
        course_module_id: bank.module.id,
        context_id: bank.module.context_id,
        category_id: bank.category.id,
        identity_id: identity.id,
        behaviour: Behaviour::VoteForIt,
        question_ids: selected.to_vec(),
    };

    let session_id = ctx.bank.create_practice_session(&session).await?;
    ctx.start_quiz_guard
        .insert(key, session_id, ctx.config.start_quiz_guard)
        .await;

    tracing::info!(
        session_id,
        cmid = bank.module.id,
        instance_id = bank.module.instance_id,
        questions = selected.len(),
        "started practice session"
    );

    Ok(session_id)
}

/// Where the browser goes to attempt the session.
pub fn attempt_url(base: &str, session_id: i32) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("sessionid", &session_id.to_string())
        .append_pair("startquiz", "1")
        .finish();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(form: &[(&str, &str)]) -> Params {
        Params::new(
            vec![],
            form.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn selected_questions_come_from_q_fields() {
        let params = params(&[
            ("startquiz", "1"),
            ("q12", "1"),
            ("qpage", "2"),
            ("q", "1"),
            ("q7", "on"),
            ("q9", "0"),
            ("qx1", "1"),
        ]);
        assert_eq!(selected_questions(&params), Ok(vec![12, 7]));
    }

    #[test]
    fn overflowing_question_id_is_invalid() {
        let params = params(&[("q99999999999", "1")]);
        assert!(matches!(
            selected_questions(&params),
            Err(RequestError::InvalidParameter(_))
        ));
    }

    #[test]
    fn attempt_url_carries_session_and_start_flag() {
        assert_eq!(
            attempt_url("/mod/studentquiz/attempt.php", 42),
            "/mod/studentquiz/attempt.php?sessionid=42&startquiz=1"
        );
        assert_eq!(
            attempt_url("/attempt.php?lang=en", 7),
            "/attempt.php?lang=en&sessionid=7&startquiz=1"
        );
    }
}
