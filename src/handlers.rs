use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, header, request::Parts},
    routing::{get, patch, post, put},
};
use log::info;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ArticleInput, ArticleStatus, Category, CategoryInput};
use crate::services::{
    ArticleQuery, ArticleService, AuthService, CategoryService, DashboardService, SearchService,
};
use crate::types::{
    AppState, ArticleDetail, ArticleListResponse, ArticleSummary, DashboardSummary, LoginRequest,
    LoginResponse, Pagination, PrincipalSummary, SetFeaturedRequest,
};

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/articles", get(list_articles))
        .route("/api/articles/:slug", get(get_article))
        .route("/api/categories", get(list_categories))
        .route("/api/admin/login", post(login))
        .route("/api/admin/verify", get(verify_token))
        .route("/api/admin/dashboard", get(dashboard))
        .route("/api/admin/articles", get(admin_list_articles).post(admin_create_article))
        .route(
            "/api/admin/articles/:id",
            get(admin_get_article)
                .put(admin_update_article)
                .delete(admin_delete_article),
        )
        .route("/api/admin/articles/:id/featured", patch(admin_set_featured))
        .route("/api/admin/categories", get(admin_list_categories).post(admin_create_category))
        .route(
            "/api/admin/categories/:id",
            put(admin_update_category).delete(admin_delete_category),
        )
        .with_state(state)
}

/// The authenticated admin principal, extracted from the bearer token
pub struct AuthAdmin(pub crate::models::Admin);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let token = header_value.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
        let auth = AuthService::new(state.store.clone(), &state.config);
        auth.verify(token).map(AuthAdmin)
    }
}

#[derive(Debug, Deserialize)]
pub struct PublicListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    /// Category name filter
    pub category: Option<String>,
    /// "draft", "published", or "all"
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Public article list: published only, newest publish date first
async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<PublicListParams>,
) -> Result<Json<ArticleListResponse>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = state.config.clamp_limit(params.limit);

    let mut query = ArticleQuery::public(page, limit);
    query.category_slug = params.category;
    query.search = params.search;
    query.featured = params.featured.unwrap_or(false);

    let result = SearchService::new(state.store.clone()).run(&query)?;
    Ok(Json(ArticleListResponse {
        articles: result
            .articles
            .iter()
            .map(|(article, category)| ArticleSummary::new(article, category))
            .collect(),
        pagination: Pagination::new(page, limit, result.total),
    }))
}

/// Public single-article fetch; increments the view counter
async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleDetail>, AppError> {
    let (article, category) = ArticleService::new(state.store.clone()).fetch_published(&slug)?;
    Ok(Json(ArticleDetail::new(&article, &category)))
}

/// Public category list: active only, sorted by order then name
async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(CategoryService::new(state.store.clone()).list_active())
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Unauthorized);
    }
    let auth = AuthService::new(state.store.clone(), &state.config);
    let (token, admin) = auth.login(&payload.email, &payload.password)?;
    Ok(Json(LoginResponse { token, admin: PrincipalSummary::from(&admin) }))
}

async fn verify_token(AuthAdmin(admin): AuthAdmin) -> Json<PrincipalSummary> {
    Json(PrincipalSummary::from(&admin))
}

async fn dashboard(State(state): State<AppState>, _admin: AuthAdmin) -> Json<DashboardSummary> {
    Json(DashboardService::new(state.store.clone()).summary())
}

/// Admin article list: no implicit status restriction, newest created first
async fn admin_list_articles(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Query(params): Query<AdminListParams>,
) -> Result<Json<ArticleListResponse>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = state.config.clamp_limit(params.limit);

    let mut query = ArticleQuery::admin(page, limit);
    query.category_name = params.category;
    query.search = params.search;
    query.status = parse_status_filter(params.status.as_deref())?;

    let result = SearchService::new(state.store.clone()).run(&query)?;
    Ok(Json(ArticleListResponse {
        articles: result
            .articles
            .iter()
            .map(|(article, category)| ArticleSummary::new(article, category))
            .collect(),
        pagination: Pagination::new(page, limit, result.total),
    }))
}

async fn admin_get_article(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleDetail>, AppError> {
    let (article, category) = ArticleService::new(state.store.clone()).get(id)?;
    Ok(Json(ArticleDetail::new(&article, &category)))
}

async fn admin_create_article(
    State(state): State<AppState>,
    AuthAdmin(admin): AuthAdmin,
    Json(input): Json<ArticleInput>,
) -> Result<(StatusCode, Json<ArticleDetail>), AppError> {
    let (article, category) = ArticleService::new(state.store.clone()).create(&input, admin.id)?;
    info!("Admin {} created article '{}'", admin.email, article.slug);
    Ok((StatusCode::CREATED, Json(ArticleDetail::new(&article, &category))))
}

async fn admin_update_article(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(input): Json<ArticleInput>,
) -> Result<Json<ArticleDetail>, AppError> {
    let (article, category) = ArticleService::new(state.store.clone()).update(id, &input)?;
    Ok(Json(ArticleDetail::new(&article, &category)))
}

async fn admin_set_featured(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetFeaturedRequest>,
) -> Result<StatusCode, AppError> {
    ArticleService::new(state.store.clone()).set_featured(id, payload.featured)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_delete_article(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ArticleService::new(state.store.clone()).delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_list_categories(
    State(state): State<AppState>,
    _admin: AuthAdmin,
) -> Json<Vec<Category>> {
    Json(CategoryService::new(state.store.clone()).list_all())
}

async fn admin_create_category(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = CategoryService::new(state.store.clone()).create(&input)?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn admin_update_category(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryService::new(state.store.clone()).update(id, &input)?;
    Ok(Json(category))
}

async fn admin_delete_category(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    CategoryService::new(state.store.clone()).delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parse an admin status filter; "all", empty, and absent mean no restriction
fn parse_status_filter(raw: Option<&str>) -> Result<Option<ArticleStatus>, AppError> {
    match raw.map(|s| s.trim().to_lowercase()) {
        None => Ok(None),
        Some(s) if s.is_empty() || s == "all" => Ok(None),
        Some(s) => ArticleStatus::parse(&s)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("unknown status '{s}'"))),
    }
}
