use async_trait::async_trait;
use diesel::prelude::*;
use diesel::{
    dsl::now,
    pg::Pg,
    sql_types::Integer,
};
use diesel_async::{
    AsyncConnection, AsyncPgConnection, RunQueryDsl,
    pooled_connection::{AsyncDieselConnectionManager, deadpool::Pool},
    scoped_futures::ScopedFutureExt,
};

use crate::{
    bank::{Category, ModuleInstance, NewPracticeSession, Pagination, QuestionFilter, QuestionPage},
    comment::{Comment, CommentType, StudentQuizQuestion},
    error::ServerError,
    identity::models::identity::Identity,
    models::{
        comment::CommentRow,
        module::CourseModule,
        practice::{NewPracticeSessionRow, NewQuestionAttempt, NewQuestionUsage},
        question::{NewQuestionCategory, QuestionCategory, QuestionRow},
    },
    schema::{
        comments, context_access, course_modules, courses, identities, practice_sessions,
        question_attempts, question_categories, question_usages, questions, sessions,
        studentquiz_questions,
    },
};

use super::{Access, CommentArea, QuestionBank};

pub type DieselPool = Pool<AsyncPgConnection>;

/// The component owning the question usages created here
const COMPONENT: &str = "mod_studentquiz";

const DEFAULT_CATEGORY_SORT_ORDER: i32 = 999;

/// First key of the advisory lock taken while creating a default category,
/// the second key is the context id
const DEFAULT_CATEGORY_LOCK: i32 = 0x5351_4443;

#[derive(Clone)]
pub struct PgStore {
    pool: DieselPool,
}

impl PgStore {
    pub fn connect(database_url: &str, max_size: usize) -> eyre::Result<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager).max_size(max_size).build()?;
        Ok(PgStore { pool })
    }
}

// escape the wildcards of a LIKE pattern
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for char in search.chars() {
        if matches!(char, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(char);
    }
    pattern.push('%');
    pattern
}

fn categories_in_context(context_id: i32) -> question_categories::BoxedQuery<'static, Pg> {
    question_categories::table
        .filter(question_categories::context_id.eq(context_id))
        .order((
            question_categories::sort_order.asc(),
            question_categories::id.asc(),
        ))
        .into_boxed()
}

fn filtered_questions(filter: &QuestionFilter) -> questions::BoxedQuery<'static, Pg> {
    let mut query = questions::table
        .filter(questions::category_id.eq_any(filter.category_ids.clone()))
        .into_boxed();

    if !filter.show_hidden {
        query = query.filter(questions::hidden.eq(false));
    }

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query = query.filter(
            questions::name
                .ilike(pattern.clone())
                .or(questions::question_text.ilike(pattern)),
        );
    }

    query
}

#[async_trait]
impl CommentArea for PgStore {
    async fn resolve_question(
        &self,
        studentquiz_question_id: i32,
        cmid: i32,
    ) -> Result<Option<StudentQuizQuestion>, ServerError> {
        let mut conn = self.pool.get().await?;

        let row = studentquiz_questions::table
            .filter(studentquiz_questions::id.eq(studentquiz_question_id))
            .filter(studentquiz_questions::course_module_id.eq(cmid))
            .select((
                studentquiz_questions::id,
                studentquiz_questions::course_module_id,
                studentquiz_questions::question_id,
            ))
            .first::<(i32, i32, i32)>(&mut conn)
            .await
            .optional()?;

        Ok(
            row.map(|(id, course_module_id, question_id)| StudentQuizQuestion {
                id,
                course_module_id,
                question_id,
            }),
        )
    }

    async fn find_comment(
        &self,
        question: &StudentQuizQuestion,
        comment_id: i32,
        comment_type: CommentType,
    ) -> Result<Option<Comment>, ServerError> {
        let mut conn = self.pool.get().await?;

        let row = comments::table
            .left_join(identities::table)
            .filter(comments::id.eq(comment_id))
            .filter(comments::studentquiz_question_id.eq(question.id))
            .filter(comments::comment_type.eq(comment_type.as_i32()))
            .select((CommentRow::as_select(), identities::traits.nullable()))
            .first::<(CommentRow, Option<serde_json::Value>)>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(|(comment, traits)| comment.into_comment(traits)))
    }

    async fn replies(&self, comment: &Comment) -> Result<Vec<Comment>, ServerError> {
        let mut conn = self.pool.get().await?;

        let rows = comments::table
            .left_join(identities::table)
            .filter(comments::parent_id.eq(comment.id))
            .filter(comments::studentquiz_question_id.eq(comment.studentquiz_question_id))
            .filter(comments::comment_type.eq(comment.comment_type.as_i32()))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select((CommentRow::as_select(), identities::traits.nullable()))
            .load::<(CommentRow, Option<serde_json::Value>)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(reply, traits)| reply.into_comment(traits))
            .collect())
    }
}

#[async_trait]
impl QuestionBank for PgStore {
    async fn resolve_module(&self, cmid: i32) -> Result<Option<ModuleInstance>, ServerError> {
        let mut conn = self.pool.get().await?;

        let row = course_modules::table
            .inner_join(courses::table)
            .filter(course_modules::id.eq(cmid))
            .select((CourseModule::as_select(), courses::fullname))
            .first::<(CourseModule, String)>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(|(module, fullname)| module.into_instance(fullname)))
    }

    async fn categories(&self, context_id: i32) -> Result<Vec<Category>, ServerError> {
        let mut conn = self.pool.get().await?;

        let rows = categories_in_context(context_id)
            .select(QuestionCategory::as_select())
            .load::<QuestionCategory>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn default_category(&self, module: &ModuleInstance) -> Result<Category, ServerError> {
        let mut conn = self.pool.get().await?;

        let existing = categories_in_context(module.context_id)
            .select(QuestionCategory::as_select())
            .first::<QuestionCategory>(&mut conn)
            .await
            .optional()?;

        if let Some(category) = existing {
            return Ok(category.into());
        }

        let (cmid, context_id) = (module.id, module.context_id);
        let name = format!("Default for {}", module.name);

        let category = conn
            .transaction::<QuestionCategory, diesel::result::Error, _>(|conn| {
                async move {
                    // serializes first visits of the same context
                    diesel::sql_query("SELECT pg_advisory_xact_lock($1, $2)")
                        .bind::<Integer, _>(DEFAULT_CATEGORY_LOCK)
                        .bind::<Integer, _>(context_id)
                        .execute(conn)
                        .await?;

                    if let Some(category) = categories_in_context(context_id)
                        .select(QuestionCategory::as_select())
                        .first::<QuestionCategory>(conn)
                        .await
                        .optional()?
                    {
                        return Ok(category);
                    }

                    tracing::info!(cmid, context_id, "creating default question category");

                    diesel::insert_into(question_categories::table)
                        .values(&NewQuestionCategory {
                            context_id,
                            parent: None,
                            name,
                            sort_order: DEFAULT_CATEGORY_SORT_ORDER,
                        })
                        .returning(QuestionCategory::as_returning())
                        .get_result(conn)
                        .await
                }
                .scope_boxed()
            })
            .await?;

        Ok(category.into())
    }

    async fn list_questions(
        &self,
        filter: &QuestionFilter,
        pagination: Pagination,
    ) -> Result<QuestionPage, ServerError> {
        let mut conn = self.pool.get().await?;

        let total: i64 = filtered_questions(filter)
            .count()
            .get_result(&mut conn)
            .await?;

        let pagination = pagination.clamp_to(total);

        let rows = filtered_questions(filter)
            .order((questions::name.asc(), questions::id.asc()))
            .limit(pagination.per_page)
            .offset(pagination.offset())
            .select(QuestionRow::as_select())
            .load::<QuestionRow>(&mut conn)
            .await?;

        Ok(QuestionPage {
            questions: rows.into_iter().map(Into::into).collect(),
            total,
            pagination,
        })
    }

    async fn questions_in_scope(
        &self,
        category_ids: &[i32],
        question_ids: &[i32],
    ) -> Result<Vec<i32>, ServerError> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pool.get().await?;

        let ids = questions::table
            .filter(questions::category_id.eq_any(category_ids.to_vec()))
            .filter(questions::id.eq_any(question_ids.to_vec()))
            .select(questions::id)
            .load::<i32>(&mut conn)
            .await?;

        Ok(ids)
    }

    async fn create_practice_session(
        &self,
        session: &NewPracticeSession,
    ) -> Result<i32, ServerError> {
        let mut conn = self.pool.get().await?;
        let session = session.clone();

        let session_id = conn
            .transaction::<i32, diesel::result::Error, _>(|conn| {
                async move {
                    let usage_id: i32 = diesel::insert_into(question_usages::table)
                        .values(&NewQuestionUsage {
                            context_id: session.context_id,
                            component: COMPONENT,
                            preferred_behaviour: session.behaviour.as_str(),
                        })
                        .returning(question_usages::id)
                        .get_result(conn)
                        .await?;

                    let session_id: i32 = diesel::insert_into(practice_sessions::table)
                        .values(&NewPracticeSessionRow {
                            course_module_id: session.course_module_id,
                            category_id: session.category_id,
                            identity_id: session.identity_id,
                            behaviour: session.behaviour.as_str(),
                            question_usage_id: usage_id,
                        })
                        .returning(practice_sessions::id)
                        .get_result(conn)
                        .await?;

                    let attempts: Vec<NewQuestionAttempt> = session
                        .question_ids
                        .iter()
                        .zip(1..)
                        .map(|(&question_id, slot)| NewQuestionAttempt {
                            question_usage_id: usage_id,
                            slot,
                            question_id,
                        })
                        .collect();

                    if !attempts.is_empty() {
                        diesel::insert_into(question_attempts::table)
                            .values(&attempts)
                            .execute(conn)
                            .await?;
                    }

                    Ok(session_id)
                }
                .scope_boxed()
            })
            .await?;

        Ok(session_id)
    }
}

#[async_trait]
impl Access for PgStore {
    async fn identity_for_token(&self, token: &str) -> Result<Option<Identity>, ServerError> {
        let mut conn = self.pool.get().await?;

        let identity = sessions::table
            .inner_join(identities::table)
            .filter(sessions::token.eq(token))
            .filter(sessions::active.eq(true))
            .filter(sessions::expires_at.gt(now))
            .filter(sessions::issued_at.le(now))
            .select(Identity::as_select())
            .first::<Identity>(&mut conn)
            .await
            .optional()?;

        Ok(identity)
    }

    async fn can_access_context(
        &self,
        identity_id: i32,
        context_id: i32,
    ) -> Result<bool, ServerError> {
        let mut conn = self.pool.get().await?;

        let allowed = diesel::select(diesel::dsl::exists(
            context_access::table
                .filter(context_access::identity_id.eq(identity_id))
                .filter(context_access::context_id.eq(context_id)),
        ))
        .get_result::<bool>(&mut conn)
        .await?;

        Ok(allowed)
    }
}
