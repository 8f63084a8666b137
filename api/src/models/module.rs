use diesel::prelude::*;

use crate::bank::ModuleInstance;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::course_modules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CourseModule {
    pub id: i32,
    pub instance_id: i32,
    pub context_id: i32,
    pub name: String,
}

impl CourseModule {
    pub fn into_instance(self, course_fullname: String) -> ModuleInstance {
        ModuleInstance {
            id: self.id,
            instance_id: self.instance_id,
            context_id: self.context_id,
            name: self.name,
            course_fullname,
        }
    }
}
