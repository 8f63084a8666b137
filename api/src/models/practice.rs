use diesel::prelude::*;

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::question_usages)]
pub struct NewQuestionUsage<'a> {
    pub context_id: i32,
    pub component: &'a str,
    pub preferred_behaviour: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::practice_sessions)]
pub struct NewPracticeSessionRow<'a> {
    pub course_module_id: i32,
    pub category_id: i32,
    pub identity_id: i32,
    pub behaviour: &'a str,
    pub question_usage_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::question_attempts)]
pub struct NewQuestionAttempt {
    pub question_usage_id: i32,
    pub slot: i32,
    pub question_id: i32,
}
