use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::bank::{Category, Question};

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::question_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QuestionCategory {
    pub id: i32,
    pub context_id: i32,
    pub parent: Option<i32>,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::question_categories)]
pub struct NewQuestionCategory {
    pub context_id: i32,
    pub parent: Option<i32>,
    pub name: String,
    pub sort_order: i32,
}

impl From<QuestionCategory> for Category {
    fn from(c: QuestionCategory) -> Self {
        Category {
            id: c.id,
            context_id: c.context_id,
            parent: c.parent,
            name: c.name,
            sort_order: c.sort_order,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QuestionRow {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub question_text: String,
    pub qtype: String,
    pub hidden: bool,
    pub created_at: NaiveDateTime,
}

impl From<QuestionRow> for Question {
    fn from(q: QuestionRow) -> Self {
        Question {
            id: q.id,
            category_id: q.category_id,
            name: q.name,
            question_text: q.question_text,
            qtype: q.qtype,
            hidden: q.hidden,
            created_at: q.created_at,
        }
    }
}
