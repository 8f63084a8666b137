pub mod render;
pub mod routes;
pub mod session;
pub mod view;

use std::collections::{HashMap, VecDeque};

use chrono::NaiveDateTime;

pub const DEFAULT_QUESTIONS_PER_PAGE: i64 = 20;
pub const MAXIMUM_QUESTIONS_PER_PAGE: i64 = 1000;

/// A StudentQuiz module placed in a course.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleInstance {
    /// The course module id, a.k.a. `cmid`
    pub id: i32,
    pub instance_id: i32,
    pub context_id: i32,
    pub name: String,
    pub course_fullname: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: i32,
    pub context_id: i32,
    pub parent: Option<i32>,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub question_text: String,
    pub qtype: String,
    pub hidden: bool,
    pub created_at: NaiveDateTime,
}

impl Question {
    #[cfg(test)]
    pub fn matches(&self, search: &str) -> bool {
        let search = search.to_lowercase();
        self.name.to_lowercase().contains(&search)
            || self.question_text.to_lowercase().contains(&search)
    }
}

/// Which questions of a bank to list.
#[derive(Clone, Debug)]
pub struct QuestionFilter {
    /// Categories in scope, already expanded to subcategories if requested
    pub category_ids: Vec<i32>,
    pub search: Option<String>,
    pub show_hidden: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pagination {
    /// 0-based
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Pagination {
            page: page.max(0),
            per_page: per_page.clamp(1, MAXIMUM_QUESTIONS_PER_PAGE),
        }
    }

    /// Moves a page past the end back to the last page.
    pub fn clamp_to(self, total: i64) -> Self {
        let last_page = if total <= 0 {
            0
        } else {
            (total - 1) / self.per_page
        };
        Pagination {
            page: self.page.min(last_page),
            ..self
        }
    }

    pub fn offset(&self) -> i64 {
        self.page * self.per_page
    }

    pub fn page_count(&self, total: i64) -> i64 {
        (total + self.per_page - 1) / self.per_page
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(0, DEFAULT_QUESTIONS_PER_PAGE)
    }
}

#[derive(Clone, Debug)]
pub struct QuestionPage {
    pub questions: Vec<Question>,
    pub total: i64,
    /// The pagination actually used, after clamping
    pub pagination: Pagination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behaviour {
    VoteForIt,
}

impl Behaviour {
    pub fn as_str(&self) -> &'static str {
        match self {
            Behaviour::VoteForIt => "voteforit",
        }
    }
}

/// Everything needed to persist a practice session in one go.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPracticeSession {
    pub course_module_id: i32,
    pub context_id: i32,
    pub category_id: i32,
    pub identity_id: i32,
    pub behaviour: Behaviour,
    /// Attached to the question usage in this order, slots start at 1
    pub question_ids: Vec<i32>,
}

/// The ids of `root` and, when `recurse` is set, of all its descendants.
/// Descendants come breadth first in `(sort_order, id)` order.
pub fn category_scope(categories: &[Category], root: i32, recurse: bool) -> Vec<i32> {
    if !recurse {
        return vec![root];
    }

    let mut children: HashMap<i32, Vec<&Category>> = HashMap::new();
    for c in categories {
        if let Some(parent) = c.parent {
            children.entry(parent).or_default().push(c);
        }
    }
    for list in children.values_mut() {
        list.sort_unstable_by_key(|c| (c.sort_order, c.id));
    }

    let mut scope = vec![];
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        // guards against a cycle in broken data
        if scope.contains(&id) {
            continue;
        }
        scope.push(id);
        if let Some(list) = children.get(&id) {
            queue.extend(list.iter().map(|c| c.id));
        }
    }

    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, parent: Option<i32>, sort_order: i32) -> Category {
        Category {
            id,
            context_id: 1,
            parent,
            name: format!("Category {id}"),
            sort_order,
        }
    }

    #[test]
    fn scope_without_recursion_is_just_the_root() {
        let categories = vec![category(1, None, 0), category(2, Some(1), 0)];
        assert_eq!(category_scope(&categories, 1, false), vec![1]);
    }

    #[test]
    fn scope_with_recursion_includes_all_descendants() {
        let categories = vec![
            category(1, None, 0),
            category(2, Some(1), 5),
            category(3, Some(1), 1),
            category(4, Some(2), 0),
            category(5, None, 0),
        ];
        assert_eq!(category_scope(&categories, 1, true), vec![1, 3, 2, 4]);
    }

    #[test]
    fn scope_survives_cycles() {
        let categories = vec![category(1, Some(2), 0), category(2, Some(1), 0)];
        assert_eq!(category_scope(&categories, 1, true), vec![1, 2]);
    }

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(Pagination::new(-1, 0), Pagination { page: 0, per_page: 1 });
        assert_eq!(Pagination::new(0, 5000).per_page, MAXIMUM_QUESTIONS_PER_PAGE);

        let p = Pagination::new(10, 20).clamp_to(45);
        assert_eq!(p.page, 2);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.page_count(45), 3);

        assert_eq!(Pagination::new(3, 20).clamp_to(0).page, 0);
    }

    #[test]
    fn search_is_case_insensitive_on_name_and_text() {
        let q = Question {
            id: 1,
            category_id: 1,
            name: "Photosynthesis".into(),
            question_text: "Where does the Calvin cycle happen?".into(),
            qtype: "multichoice".into(),
            hidden: false,
            created_at: chrono::NaiveDateTime::default(),
        };
        assert!(q.matches("photo"));
        assert!(q.matches("CALVIN"));
        assert!(!q.matches("mitosis"));
    }
}
