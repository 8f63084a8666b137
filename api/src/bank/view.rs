use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    App,
    error::{AppError, RequestError},
    extract::{Form, Query},
    identity::{AuthUser, models::identity::Identity},
    params::{Params, positive_id},
};

use super::{
    Category, DEFAULT_QUESTIONS_PER_PAGE, ModuleInstance, Pagination, QuestionFilter,
    category_scope, render, session,
};

/// The cleaned parameters of the question bank page.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParams {
    pub cmid: i32,
    pub search: Option<String>,
    pub pagination: Pagination,
    /// `(category id, context id)`
    pub category: Option<(i32, i32)>,
    pub recurse: bool,
    pub show_hidden: bool,
    pub show_text: bool,
    pub last_changed: Option<i32>,
    pub start_quiz: bool,
}

impl ViewParams {
    pub fn from_params(params: &Params) -> Result<Self, RequestError> {
        let cmid = match params.optional_int("id")? {
            Some(id) if id != 0 => id,
            _ => params.required_int("cmid")?,
        };

        Ok(ViewParams {
            cmid: positive_id("cmid", cmid)?,
            search: params
                .raw("search")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            pagination: Pagination::new(
                params.optional_int("qpage")?.unwrap_or(0).into(),
                params
                    .optional_int("qperpage")?
                    .map(i64::from)
                    .unwrap_or(DEFAULT_QUESTIONS_PER_PAGE),
            ),
            category: parse_category(params.raw("cat"))?,
            recurse: params.optional_bool("recurse", true),
            show_hidden: params.optional_bool("showhidden", false),
            show_text: params.optional_bool("qbshowtext", false),
            last_changed: params.optional_int("lastchanged")?.filter(|id| *id != 0),
            start_quiz: params.optional_bool("startquiz", false),
        })
    }
}

/// Parses `"<category id>,<context id>"`.
fn parse_category(raw: Option<&str>) -> Result<Option<(i32, i32)>, RequestError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let invalid = || RequestError::invalid("`cat` must look like `<categoryid>,<contextid>`");
    let (category, context) = raw.split_once(',').ok_or_else(invalid)?;
    let category = category.trim().parse::<i32>().map_err(|_| invalid())?;
    let context = context.trim().parse::<i32>().map_err(|_| invalid())?;
    Ok(Some((category, context)))
}

/// Everything resolved for one request of the question bank page.
#[derive(Debug, Clone)]
pub struct BankView {
    pub params: ViewParams,
    pub module: ModuleInstance,
    pub category: Category,
    /// Category ids the page shows questions of
    pub scope: Vec<i32>,
    /// Shown in the page header
    pub viewer_name: Option<String>,
}

impl BankView {
    pub async fn prepare(ctx: &App, identity: &Identity, params: &Params) -> Result<Self, AppError> {
        let params = ViewParams::from_params(params)?;

        let module = ctx
            .bank
            .resolve_module(params.cmid)
            .await?
            .ok_or(RequestError::NotFound("invalidcoursemodule"))?;

        if !ctx
            .access
            .can_access_context(identity.id, module.context_id)
            .await?
        {
            tracing::warn!(
                identity_id = identity.id,
                cmid = module.id,
                "denied question bank access"
            );
            return Err(RequestError::Forbidden("mod/studentquiz:view").into());
        }

        let default_category = ctx.bank.default_category(&module).await?;
        let categories = ctx.bank.categories(module.context_id).await?;

        let category = match params.category {
            None => default_category,
            Some((category_id, context_id)) => {
                if context_id != module.context_id {
                    return Err(RequestError::invalid(
                        "the category does not belong to this question bank",
                    )
                    .into());
                }
                categories
                    .iter()
                    .find(|c| c.id == category_id)
                    .cloned()
                    .ok_or_else(|| {
                        RequestError::invalid("the category does not belong to this question bank")
                    })?
            }
        };

        let scope = category_scope(&categories, category.id, params.recurse);

        Ok(BankView {
            params,
            module,
            category,
            scope,
            viewer_name: identity.get_traits().name,
        })
    }

    fn filter(&self) -> QuestionFilter {
        QuestionFilter {
            category_ids: self.scope.clone(),
            search: self.params.search.clone(),
            show_hidden: self.params.show_hidden,
        }
    }
}

async fn list(ctx: &App, bank: &BankView) -> Result<Html<String>, AppError> {
    let page = ctx
        .bank
        .list_questions(&bank.filter(), bank.params.pagination)
        .await?;

    tracing::debug!(
        cmid = bank.module.id,
        category_id = bank.category.id,
        total = page.total,
        "listed questions"
    );

    Ok(Html(render::render_page(bank, &page)))
}

#[debug_handler]
pub async fn view(
    State(ctx): State<App>,
    AuthUser(identity): AuthUser,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let params = Params::new(query, vec![]);
    let bank = BankView::prepare(&ctx, &identity, &params).await?;
    list(&ctx, &bank).await
}

#[debug_handler]
pub async fn submit(
    State(ctx): State<App>,
    AuthUser(identity): AuthUser,
    Query(query): Query<Vec<(String, String)>>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let params = Params::new(query, form);
    let bank = BankView::prepare(&ctx, &identity, &params).await?;

    if bank.params.start_quiz {
        let selected = session::selected_questions(&params)?;
        let session_id = session::start_quiz(&ctx, &identity, &bank, &selected).await?;
        let to = session::attempt_url(&ctx.config.attempt_url, session_id);
        return Ok(Redirect::to(&to).into_response());
    }

    Ok(list(&ctx, &bank).await?.into_response())
}
