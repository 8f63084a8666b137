use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::comment::{Comment, CommentType};

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: i32,
    pub studentquiz_question_id: i32,
    pub parent_id: Option<i32>,
    pub identity_id: Option<i32>,
    pub comment_type: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub edited_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

impl CommentRow {
    /// `author_traits` are the traits of the joined identity, if any.
    pub fn into_comment(self, author_traits: Option<serde_json::Value>) -> Comment {
        let comment_type = CommentType::try_from(i64::from(self.comment_type)).unwrap_or_else(|e| {
            tracing::error!(comment_id = self.id, "{e} stored for comment");
            CommentType::Public
        });

        Comment {
            id: self.id,
            studentquiz_question_id: self.studentquiz_question_id,
            parent_id: self.parent_id,
            identity_id: self.identity_id,
            author_name: author_traits
                .map(crate::identity::models::identity::Traits::from)
                .and_then(|t| t.name),
            comment_type,
            content: self.content,
            created_at: self.created_at,
            edited_at: self.edited_at,
            deleted_at: self.deleted_at,
        }
    }
}
