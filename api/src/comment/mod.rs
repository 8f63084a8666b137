pub mod expand;
pub mod routes;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Characters of content kept in `shortcontent`
pub const SHORTEN_LENGTH: usize = 75;

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CommentType {
    #[default]
    Public,
    Private,
}

impl CommentType {
    pub fn as_i32(self) -> i32 {
        match self {
            CommentType::Public => 0,
            CommentType::Private => 1,
        }
    }
}

impl TryFrom<i64> for CommentType {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CommentType::Public),
            1 => Ok(CommentType::Private),
            other => Err(format!("invalid comment type `{other}`")),
        }
    }
}

impl<'de> Deserialize<'de> for CommentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        CommentType::try_from(i64::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

impl Serialize for CommentType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.as_i32())
    }
}

/// A question placed in a StudentQuiz module. Its comment area is keyed by
/// this id.
#[derive(Clone, Debug, PartialEq)]
pub struct StudentQuizQuestion {
    pub id: i32,
    pub course_module_id: i32,
    pub question_id: i32,
}

#[derive(Clone, Debug)]
pub struct Comment {
    pub id: i32,
    pub studentquiz_question_id: i32,
    /// `None` for root comments
    pub parent_id: Option<i32>,
    pub identity_id: Option<i32>,
    pub author_name: Option<String>,
    pub comment_type: CommentType,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub edited_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Shapes the comment for the client. `viewer` is the identity asking,
    /// used to work out ownership.
    pub fn to_view(&self, viewer: i32, number_of_replies: usize) -> CommentView {
        let deleted = self.is_deleted();
        let is_creator = self.identity_id == Some(viewer);
        let (content, short_content) = if deleted {
            (String::new(), String::new())
        } else {
            (
                self.content.clone(),
                crate::utils::shorten_text(&self.content, SHORTEN_LENGTH),
            )
        };

        CommentView {
            id: self.id,
            studentquiz_question_id: self.studentquiz_question_id,
            parent_id: self.parent_id.unwrap_or(0),
            comment_type: self.comment_type,
            content,
            short_content,
            number_of_replies,
            author_name: self
                .author_name
                .clone()
                .unwrap_or_else(|| ANONYMOUS_AUTHOR.into()),
            post_time: self.created_at.and_utc().timestamp(),
            last_edit_time: self.edited_at.map(|t| t.and_utc().timestamp()),
            deleted,
            deleted_time: self.deleted_at.map(|t| t.and_utc().timestamp()),
            root: self.parent_id.is_none(),
            is_creator,
            can_edit: is_creator && !deleted,
            can_delete: is_creator && !deleted,
        }
    }
}

// The model that will be returned to the client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentView {
    pub id: i32,
    #[serde(rename = "studentquizquestionid")]
    pub studentquiz_question_id: i32,
    #[serde(rename = "parentid")]
    pub parent_id: i32,
    #[serde(rename = "type")]
    pub comment_type: CommentType,
    pub content: String,
    #[serde(rename = "shortcontent")]
    pub short_content: String,
    #[serde(rename = "numberofreply")]
    pub number_of_replies: usize,
    #[serde(rename = "authorname")]
    pub author_name: String,
    #[serde(rename = "posttime")]
    pub post_time: i64,
    #[serde(rename = "lastedittime")]
    pub last_edit_time: Option<i64>,
    pub deleted: bool,
    #[serde(rename = "deletedtime")]
    pub deleted_time: Option<i64>,
    pub root: bool,
    #[serde(rename = "iscreator")]
    pub is_creator: bool,
    #[serde(rename = "canedit")]
    pub can_edit: bool,
    #[serde(rename = "candelete")]
    pub can_delete: bool,
}

/// A comment together with its direct replies. Replies are one level deep.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExpandedComment {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}
