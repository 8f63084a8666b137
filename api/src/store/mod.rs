//! Collaborators the handlers delegate to. `PgStore` implements all of them on
//! top of PostgreSQL.

#[cfg(test)]
pub mod memory;
pub mod pg;

use async_trait::async_trait;

use crate::{
    bank::{Category, ModuleInstance, NewPracticeSession, Pagination, QuestionFilter, QuestionPage},
    comment::{Comment, CommentType, StudentQuizQuestion},
    error::ServerError,
    identity::models::identity::Identity,
};

pub use pg::PgStore;

/// Threaded comments attached to StudentQuiz questions.
#[async_trait]
pub trait CommentArea: Send + Sync {
    /// The question `studentquiz_question_id` if it belongs to the module
    /// `cmid`.
    async fn resolve_question(
        &self,
        studentquiz_question_id: i32,
        cmid: i32,
    ) -> Result<Option<StudentQuizQuestion>, ServerError>;

    /// A comment of the question's comment area of the given type.
    async fn find_comment(
        &self,
        question: &StudentQuizQuestion,
        comment_id: i32,
        comment_type: CommentType,
    ) -> Result<Option<Comment>, ServerError>;

    /// Direct replies in the same comment area, same question and type,
    /// ordered by creation time, then id.
    async fn replies(&self, comment: &Comment) -> Result<Vec<Comment>, ServerError>;
}

/// Question categories, questions and practice sessions of StudentQuiz modules.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    async fn resolve_module(&self, cmid: i32) -> Result<Option<ModuleInstance>, ServerError>;

    /// All categories of a context ordered by `(sort_order, id)`.
    async fn categories(&self, context_id: i32) -> Result<Vec<Category>, ServerError>;

    /// The first category of the module context, created when the context has
    /// none yet.
    async fn default_category(&self, module: &ModuleInstance) -> Result<Category, ServerError>;

    /// One page of the questions matching `filter`. A page past the end is
    /// clamped to the last page.
    async fn list_questions(
        &self,
        filter: &QuestionFilter,
        pagination: Pagination,
    ) -> Result<QuestionPage, ServerError>;

    /// The subset of `question_ids` that lives in one of `category_ids`.
    async fn questions_in_scope(
        &self,
        category_ids: &[i32],
        question_ids: &[i32],
    ) -> Result<Vec<i32>, ServerError>;

    /// Creates the question usage, the session and its question attempts
    /// atomically and returns the new session id.
    async fn create_practice_session(
        &self,
        session: &NewPracticeSession,
    ) -> Result<i32, ServerError>;
}

/// Who is calling and what they may see.
#[async_trait]
pub trait Access: Send + Sync {
    async fn identity_for_token(&self, token: &str) -> Result<Option<Identity>, ServerError>;

    async fn can_access_context(
        &self,
        identity_id: i32,
        context_id: i32,
    ) -> Result<bool, ServerError>;
}
