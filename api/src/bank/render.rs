use url::form_urlencoded::Serializer;

use crate::utils::{escape_html, render_template, shorten_text};

use super::{Question, QuestionPage, view::BankView};

const VIEW_HTML_TEMPLATE: &str = include_str!("view.html");

const QUESTION_TEXT_PREVIEW: usize = 200;

/// The query string that reproduces the current listing, on `page`.
fn listing_query(bank: &BankView, page: i64, per_page: i64) -> String {
    let mut query = Serializer::new(String::new());
    query.append_pair("cmid", &bank.module.id.to_string());
    query.append_pair(
        "cat",
        &format!("{},{}", bank.category.id, bank.category.context_id),
    );
    query.append_pair("recurse", bool_param(bank.params.recurse));
    query.append_pair("showhidden", bool_param(bank.params.show_hidden));
    query.append_pair("qbshowtext", bool_param(bank.params.show_text));
    if let Some(search) = &bank.params.search {
        query.append_pair("search", search);
    }
    query.append_pair("qperpage", &per_page.to_string());
    query.append_pair("qpage", &page.to_string());
    query.finish()
}

fn bool_param(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn hidden_input(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        escape_html(name),
        escape_html(value)
    )
}

fn render_row(question: &Question, show_text: bool, last_changed: Option<i32>) -> String {
    let mut classes = vec![];
    if last_changed == Some(question.id) {
        classes.push("lastchanged");
    }
    if question.hidden {
        classes.push("hidden-question");
    }

    let mut name = escape_html(&question.name);
    if question.hidden {
        name.push_str(" <em>(hidden)</em>");
    }
    if show_text {
        name.push_str(&format!(
            r#"<div class="question-text">{}</div>"#,
            escape_html(&shorten_text(&question.question_text, QUESTION_TEXT_PREVIEW))
        ));
    }

    format!(
        r#"<tr id="q{id}" class="{classes}" data-category="{category}"><td><input type="checkbox" name="q{id}" value="1"></td><td>{name}</td><td>{qtype}</td><td>{created}</td></tr>"#,
        id = question.id,
        category = question.category_id,
        classes = classes.join(" "),
        qtype = escape_html(&question.qtype),
        created = question.created_at.format("%Y-%m-%d %H:%M"),
    )
}

fn render_pagination(bank: &BankView, page: &QuestionPage) -> String {
    let pagination = page.pagination;
    let page_count = pagination.page_count(page.total);
    if page_count <= 1 {
        return String::new();
    }

    (0..page_count)
        .map(|p| {
            if p == pagination.page {
                format!("<strong>{}</strong>", p + 1)
            } else {
                format!(
                    r#"<a href="view.php?{}">{}</a>"#,
                    escape_html(&listing_query(bank, p, pagination.per_page)),
                    p + 1
                )
            }
        })
        .collect()
}

pub fn render_page(bank: &BankView, page: &QuestionPage) -> String {
    let rows = if page.questions.is_empty() {
        r#"<tr><td colspan="4">No questions found</td></tr>"#.to_string()
    } else {
        page.questions
            .iter()
            .map(|q| render_row(q, bank.params.show_text, bank.params.last_changed))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let filter_fields = [
        hidden_input(
            "cat",
            &format!("{},{}", bank.category.id, bank.category.context_id),
        ),
        hidden_input("recurse", bool_param(bank.params.recurse)),
        hidden_input("showhidden", bool_param(bank.params.show_hidden)),
        hidden_input("qbshowtext", bool_param(bank.params.show_text)),
        hidden_input("qperpage", &page.pagination.per_page.to_string()),
    ]
    .join("\n");

    let action = format!(
        "view.php?{}",
        listing_query(bank, page.pagination.page, page.pagination.per_page)
    );

    let title = escape_html(&bank.module.name);
    let course = escape_html(&bank.module.course_fullname);
    let category = escape_html(&bank.category.name);
    let search = escape_html(bank.params.search.as_deref().unwrap_or_default());
    let viewer = bank
        .viewer_name
        .as_deref()
        .map(|name| format!("Logged in as {}", escape_html(name)))
        .unwrap_or_default();
    let cmid = bank.module.id.to_string();
    let action = escape_html(&action);
    let total = page.total.to_string();
    let pagination = render_pagination(bank, page);

    render_template(
        VIEW_HTML_TEMPLATE,
        &[
            ("{{title}}", title.as_str()),
            ("{{course}}", course.as_str()),
            ("{{viewer}}", viewer.as_str()),
            ("{{category}}", category.as_str()),
            ("{{cmid}}", cmid.as_str()),
            ("{{filter-fields}}", filter_fields.as_str()),
            ("{{search}}", search.as_str()),
            ("{{action}}", action.as_str()),
            ("{{total}}", total.as_str()),
            ("{{pagination}}", pagination.as_str()),
            ("{{rows}}", rows.as_str()),
        ],
    )
}
