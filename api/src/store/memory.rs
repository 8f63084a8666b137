//! An in-memory store driving the handlers in tests.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    bank::{
        Category, ModuleInstance, NewPracticeSession, Pagination, Question, QuestionFilter,
        QuestionPage,
    },
    comment::{Comment, CommentType, StudentQuizQuestion},
    error::ServerError,
    identity::models::identity::{Identity, Traits},
};

use super::{Access, CommentArea, QuestionBank};

#[derive(Default)]
pub struct MemoryData {
    pub modules: Vec<ModuleInstance>,
    pub categories: Vec<Category>,
    pub questions: Vec<Question>,
    pub studentquiz_questions: Vec<StudentQuizQuestion>,
    pub comments: Vec<Comment>,
    pub tokens: Vec<(String, Identity)>,
    pub access: HashSet<(i32, i32)>,
    pub sessions: Vec<(i32, NewPracticeSession)>,
    /// Collaborator calls in the order they happened
    pub calls: Vec<&'static str>,
    next_id: i32,
}

impl MemoryData {
    pub fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        1000 + self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
}

pub fn at(minutes: i64) -> NaiveDateTime {
    NaiveDateTime::default() + chrono::Duration::minutes(minutes)
}

impl MemoryStore {
    pub fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_identity(&self, id: i32, name: &str, token: &str) -> Identity {
        let identity = Identity {
            id,
            traits: serde_json::Value::from(&Traits {
                name: Some(name.into()),
            }),
        };
        self.data()
            .tokens
            .push((token.to_string(), identity.clone()));
        identity
    }

    pub fn grant(&self, identity_id: i32, context_id: i32) {
        self.data().access.insert((identity_id, context_id));
    }

    pub fn add_module(&self, id: i32, context_id: i32) -> ModuleInstance {
        let module = ModuleInstance {
            id,
            instance_id: id * 10,
            context_id,
            name: format!("StudentQuiz {id}"),
            course_fullname: "Biology 101".into(),
        };
        self.data().modules.push(module.clone());
        module
    }

    pub fn add_category(&self, id: i32, context_id: i32, parent: Option<i32>) -> Category {
        let category = Category {
            id,
            context_id,
            parent,
            name: format!("Category {id}"),
            sort_order: id,
        };
        self.data().categories.push(category.clone());
        category
    }

    pub fn add_question(&self, id: i32, category_id: i32, name: &str, hidden: bool) -> Question {
        let question = Question {
            id,
            category_id,
            name: name.into(),
            question_text: format!("Text of {name}"),
            qtype: "multichoice".into(),
            hidden,
            created_at: at(id as i64),
        };
        self.data().questions.push(question.clone());
        question
    }

    pub fn add_studentquiz_question(
        &self,
        id: i32,
        module: &ModuleInstance,
        question_id: i32,
    ) -> StudentQuizQuestion {
        let sqq = StudentQuizQuestion {
            id,
            course_module_id: module.id,
            question_id,
        };
        self.data().studentquiz_questions.push(sqq.clone());
        sqq
    }

    pub fn add_comment(
        &self,
        id: i32,
        studentquiz_question_id: i32,
        parent_id: Option<i32>,
        author: Option<&Identity>,
        minute: i64,
    ) -> Comment {
        let comment = Comment {
            id,
            studentquiz_question_id,
            parent_id,
            identity_id: author.map(|a| a.id),
            author_name: author.and_then(|a| a.get_traits().name),
            comment_type: CommentType::Public,
            content: format!("Comment {id}"),
            created_at: at(minute),
            edited_at: None,
            deleted_at: None,
        };
        self.data().comments.push(comment.clone());
        comment
    }
}

#[async_trait]
impl CommentArea for MemoryStore {
    async fn resolve_question(
        &self,
        studentquiz_question_id: i32,
        cmid: i32,
    ) -> Result<Option<StudentQuizQuestion>, ServerError> {
        let mut data = self.data();
        data.calls.push("resolve_question");
        Ok(data
            .studentquiz_questions
            .iter()
            .find(|q| q.id == studentquiz_question_id && q.course_module_id == cmid)
            .cloned())
    }

    async fn find_comment(
        &self,
        question: &StudentQuizQuestion,
        comment_id: i32,
        comment_type: CommentType,
    ) -> Result<Option<Comment>, ServerError> {
        let mut data = self.data();
        data.calls.push("find_comment");
        Ok(data
            .comments
            .iter()
            .find(|c| {
                c.id == comment_id
                    && c.studentquiz_question_id == question.id
                    && c.comment_type == comment_type
            })
            .cloned())
    }

    async fn replies(&self, comment: &Comment) -> Result<Vec<Comment>, ServerError> {
        let mut data = self.data();
        data.calls.push("replies");
        let mut replies: Vec<Comment> = data
            .comments
            .iter()
            .filter(|c| {
                c.parent_id == Some(comment.id)
                    && c.studentquiz_question_id == comment.studentquiz_question_id
                    && c.comment_type == comment.comment_type
            })
            .cloned()
            .collect();
        replies.sort_by_key(|c| (c.created_at, c.id));
        Ok(replies)
    }
}

#[async_trait]
impl QuestionBank for MemoryStore {
    async fn resolve_module(&self, cmid: i32) -> Result<Option<ModuleInstance>, ServerError> {
        let mut data = self.data();
        data.calls.push("resolve_module");
        Ok(data.modules.iter().find(|m| m.id == cmid).cloned())
    }

    async fn categories(&self, context_id: i32) -> Result<Vec<Category>, ServerError> {
        let mut categories: Vec<Category> = self
            .data()
            .categories
            .iter()
            .filter(|c| c.context_id == context_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| (c.sort_order, c.id));
        Ok(categories)
    }

    async fn default_category(&self, module: &ModuleInstance) -> Result<Category, ServerError> {
        let mut data = self.data();
        let first = data
            .categories
            .iter()
            .filter(|c| c.context_id == module.context_id)
            .min_by_key(|c| (c.sort_order, c.id))
            .cloned();
        if let Some(first) = first {
            return Ok(first);
        }

        let category = Category {
            id: data.next_id(),
            context_id: module.context_id,
            parent: None,
            name: format!("Default for {}", module.name),
            sort_order: 999,
        };
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn list_questions(
        &self,
        filter: &QuestionFilter,
        pagination: Pagination,
    ) -> Result<QuestionPage, ServerError> {
        let mut matching: Vec<Question> = self
            .data()
            .questions
            .iter()
            .filter(|q| filter.category_ids.contains(&q.category_id))
            .filter(|q| filter.show_hidden || !q.hidden)
            .filter(|q| filter.search.as_deref().is_none_or(|s| q.matches(s)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let pagination = pagination.clamp_to(total);
        let questions = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.per_page as usize)
            .collect();

        Ok(QuestionPage {
            questions,
            total,
            pagination,
        })
    }

    async fn questions_in_scope(
        &self,
        category_ids: &[i32],
        question_ids: &[i32],
    ) -> Result<Vec<i32>, ServerError> {
        Ok(self
            .data()
            .questions
            .iter()
            .filter(|q| category_ids.contains(&q.category_id) && question_ids.contains(&q.id))
            .map(|q| q.id)
            .collect())
    }

    async fn create_practice_session(
        &self,
        session: &NewPracticeSession,
    ) -> Result<i32, ServerError> {
        let mut data = self.data();
        data.calls.push("create_practice_session");
        let id = data.next_id();
        data.sessions.push((id, session.clone()));
        Ok(id)
    }
}

#[async_trait]
impl Access for MemoryStore {
    async fn identity_for_token(&self, token: &str) -> Result<Option<Identity>, ServerError> {
        Ok(self
            .data()
            .tokens
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, i)| i.clone()))
    }

    async fn can_access_context(
        &self,
        identity_id: i32,
        context_id: i32,
    ) -> Result<bool, ServerError> {
        let mut data = self.data();
        data.calls.push("can_access_context");
        Ok(data.access.contains(&(identity_id, context_id)))
    }
}
