use axum::{debug_handler, extract::State};
use serde::Deserialize;

use crate::{
    App,
    error::{AppError, RequestError},
    extract::Json,
    identity::AuthUser,
    params::positive_id,
};

use super::{CommentType, ExpandedComment};

#[derive(Deserialize, Debug)]
pub struct ExpandCommentParams {
    studentquizquestionid: i32,
    cmid: i32,
    commentid: i32,
    #[serde(rename = "type", default)]
    comment_type: CommentType,
}

/// Returns a comment of a question's comment area together with its direct
/// replies.
#[debug_handler]
pub async fn expand_comment(
    State(ctx): State<App>,
    AuthUser(identity): AuthUser,
    Json(params): Json<ExpandCommentParams>,
) -> Result<axum::Json<ExpandedComment>, AppError> {
    let studentquiz_question_id =
        positive_id("studentquizquestionid", params.studentquizquestionid)?;
    let cmid = positive_id("cmid", params.cmid)?;
    let comment_id = positive_id("commentid", params.commentid)?;

    let module = ctx
        .bank
        .resolve_module(cmid)
        .await?
        .ok_or(RequestError::NotFound("invalidcoursemodule"))?;

    // nothing of the comment area is looked at before this passes
    if !ctx
        .access
        .can_access_context(identity.id, module.context_id)
        .await?
    {
        tracing::warn!(
            identity_id = identity.id,
            context_id = module.context_id,
            "denied comment expansion"
        );
        return Err(RequestError::Forbidden("mod/studentquiz:view").into());
    }

    let question = ctx
        .comments
        .resolve_question(studentquiz_question_id, module.id)
        .await?
        .ok_or(RequestError::NotFound("invalidstudentquizquestion"))?;

    let comment = ctx
        .comments
        .find_comment(&question, comment_id, params.comment_type)
        .await?
        .ok_or(RequestError::NotFound("invalidcomment"))?;

    let replies = ctx.comments.replies(&comment).await?;

    tracing::debug!(
        comment_id,
        cmid = question.course_module_id,
        question_id = question.question_id,
        replies = replies.len(),
        "expanded comment"
    );

    Ok(axum::Json(ExpandedComment {
        comment: comment.to_view(identity.id, replies.len()),
        replies: replies.iter().map(|r| r.to_view(identity.id, 0)).collect(),
    }))
}
