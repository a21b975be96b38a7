use std::path::PathBuf;

use anyhow::Context as _;
use axum::{
    Form, Router,
    extract::{FromRequestParts, Path, Query, Request},
    http::{HeaderValue, StatusCode, request::Parts},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tera::Context;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::templates;
use foodbase_core::db::Database;
use foodbase_core::models::FoodEdit;

const BODY_LIMIT: usize = 64 * 1024; // 64 KB

const UPDATE_MESSAGE: &str = "Food Updated Successfully";

#[derive(Clone)]
struct AppState {
    db_path: PathBuf,
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct MessageQuery {
    message: Option<String>,
}

#[derive(Deserialize)]
struct UpdateForm {
    id: i64,
    short_desc: String,
    long_desc: String,
    manufac_name: String,
    sci_name: String,
    /// Name of the food group the food should move to.
    name: String,
    #[serde(default)]
    current_page: u32,
}

impl From<UpdateForm> for FoodEdit {
    fn from(form: UpdateForm) -> Self {
        FoodEdit {
            id: form.id,
            short_desc: form.short_desc,
            long_desc: form.long_desc,
            manufac_name: form.manufac_name,
            sci_name: form.sci_name,
            group_name: form.name,
        }
    }
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        error_page(status, &message)
    }
}

/// Render failures as an HTML page, falling back to plain text when the
/// templates themselves are broken.
fn error_page(status: StatusCode, message: &str) -> Response {
    let mut context = Context::new();
    context.insert("status", &status.as_u16());
    context.insert("reason", status.canonical_reason().unwrap_or(""));
    context.insert("message", message);
    match templates::render("error.html", &context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!("failed to render error page: {err:#}");
            (status, message.to_string()).into_response()
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

// --- Per-request connection ---

/// A database connection that lives for exactly one request.
///
/// It is opened before the handler runs and closed when the handler's
/// arguments are dropped, whether the handler succeeds or fails.
struct Db(Database);

impl FromRequestParts<AppState> for Db {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let db = Database::connect(&state.db_path).context("database connection failed")?;
        Ok(Db(db))
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'; style-src 'unsafe-inline'; form-action 'self'"),
    );
    response
}

// --- Handlers ---

fn render(template: &str, context: &Context) -> Result<Html<String>, ApiError> {
    Ok(Html(templates::render(template, context)?))
}

async fn home(Db(db): Db) -> Result<Html<String>, ApiError> {
    let groups = db.list_food_groups().context("database error")?;

    let mut context = Context::new();
    context.insert("all_food_group", &groups);
    render("home.html", &context)
}

async fn show_group(Db(db): Db, Path(group_id): Path<i64>) -> Result<Html<String>, ApiError> {
    let foods = db.group_foods(group_id).context("database error")?;

    let mut context = Context::new();
    context.insert("group_id", &group_id);
    context.insert("foods", &foods);
    render("show.html", &context)
}

async fn about_first(db: Db, query: Query<MessageQuery>) -> Result<Html<String>, ApiError> {
    about_page(db, 0, query.0.message)
}

async fn about(
    db: Db,
    Path(page): Path<u32>,
    Query(query): Query<MessageQuery>,
) -> Result<Html<String>, ApiError> {
    about_page(db, page, query.message)
}

fn about_page(Db(db): Db, page: u32, message: Option<String>) -> Result<Html<String>, ApiError> {
    let listing = db.food_page(page).context("database error")?;

    let mut context = Context::new();
    context.insert("all_food", &listing.foods);
    context.insert("food_groups", &listing.food_groups);
    context.insert("current_page", &listing.current_page);
    context.insert("prev_page", &listing.prev_page);
    context.insert("next_page", &listing.next_page);
    context.insert("message", &message);
    render("about.html", &context)
}

async fn update_food(Db(db): Db, Form(form): Form<UpdateForm>) -> Result<Redirect, ApiError> {
    let page = form.current_page;
    let edit = FoodEdit::from(form);
    let changed = db
        .update_food(&edit)
        .with_context(|| format!("failed to update food {}", edit.id))?;
    tracing::info!(food_id = edit.id, changed, "food updated");

    Ok(Redirect::to(&format!(
        "/about/{page}/?message={}",
        percent_encode_component(UPDATE_MESSAGE)
    )))
}

async fn update_redirect() -> Redirect {
    Redirect::to("/about/")
}

async fn show_nutrients(Db(db): Db, Path(key): Path<String>) -> Result<Html<String>, ApiError> {
    let (food_id, page) = parse_food_page(&key)?;
    let food = db.find_food(food_id).context("database error")?;
    let nutrients = db.food_nutrients(food_id).context("database error")?;

    let mut context = Context::new();
    context.insert("food", &food);
    context.insert("nutrients", &nutrients);
    context.insert("page", &page);
    render("nutrients.html", &context)
}

async fn show_food_weights(
    Db(db): Db,
    Path(key): Path<String>,
) -> Result<Html<String>, ApiError> {
    let (food_id, page) = parse_food_page(&key)?;
    let food = db.find_food(food_id).context("database error")?;
    let weights = db.food_weights(food_id).context("database error")?;

    let mut context = Context::new();
    context.insert("food", &food);
    context.insert("weights", &weights);
    context.insert("page", &page);
    render("weights.html", &context)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("No such page".to_string())
}

/// Split a `{food_id}-{page}` path segment.
fn parse_food_page(key: &str) -> Result<(i64, u32), ApiError> {
    let invalid = || ApiError::BadRequest(format!("Invalid food reference '{key}'"));
    let (food_id, page) = key.rsplit_once('-').ok_or_else(invalid)?;
    let food_id = food_id.parse().map_err(|_| invalid())?;
    let page = page.parse().map_err(|_| invalid())?;
    Ok((food_id, page))
}

/// Minimal percent-encoding for a URL query parameter value.
///
/// Encodes characters that are not unreserved per RFC 3986 and would break
/// query-parameter parsing (`:`, `/`, `?`, `#`, `&`, `=`, `+`, `%`, space).
fn percent_encode_component(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push('%');
                encoded.push(char::from(HEX_CHARS[(byte >> 4) as usize]));
                encoded.push(char::from(HEX_CHARS[(byte & 0x0F) as usize]));
            }
        }
    }
    encoded
}

const HEX_CHARS: [u8; 16] = *b"0123456789ABCDEF";

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/home", get(home))
        .route("/show/{group_id}/", get(show_group))
        .route("/about/", get(about_first).post(about_first))
        .route("/about/{page}/", get(about).post(about))
        .route("/update", get(update_redirect).post(update_food))
        .route("/showNutrients/{key}", get(show_nutrients))
        .route("/showFoodWeights/{key}", get(show_food_weights))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(db_path: PathBuf, port: u16, bind: &str) -> anyhow::Result<()> {
    // Make sure the tables exist before the first request opens a connection.
    Database::open(&db_path)?;

    let app = build_router(AppState { db_path });

    if bind != "127.0.0.1" && bind != "localhost" {
        tracing::warn!(
            "listening on {bind}; any device on your network can view and edit the food database"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    tracing::info!("listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use foodbase_core::sr_import::{ImportOptions, import_into};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn line(fields: &[&str]) -> String {
        format!("{}\n", fields.join("^"))
    }

    fn write_dataset(dir: &std::path::Path) {
        let groups = line(&["0100", "Dairy"]) + &line(&["0200", "Spices"]);
        let foods = line(&[
            "01001", "0100", "Butter, salted", "BUTTER,WITH SALT", "", "", "Y", "", "0", "",
            "6.38", "4.27", "8.79", "3.87",
        ]) + &line(&[
            "02001", "0200", "Spices, allspice, ground", "ALLSPICE,GROUND", "", "", "Y", "",
            "0", "Pimenta dioica", "6.25", "2.44", "8.37", "3.57",
        ]);
        let nutrients = line(&["203", "g", "PROCNT", "Protein", "2", "600"]);
        let nutrition = line(&[
            "01001", "203", "0.85", "16", "0.074", "1", "", "", "", "", "0.5", "1.2", "15",
            "", "", "", "11/1976", "",
        ]);
        let weights = line(&["01001", "2", "1", "tbsp", "14.2", "", ""]);

        std::fs::write(dir.join("FD_GROUP.txt"), groups).unwrap();
        std::fs::write(dir.join("FOOD_DES.txt"), foods).unwrap();
        std::fs::write(dir.join("NUTR_DEF.txt"), nutrients).unwrap();
        std::fs::write(dir.join("NUT_DATA.txt"), nutrition).unwrap();
        std::fs::write(dir.join("WEIGHT.txt"), weights).unwrap();
    }

    /// Imported database plus the temp dir that keeps it alive.
    fn test_app() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());
        let db_path = dir.path().join("usda.db");
        import_into(&db_path, dir.path(), ImportOptions::default())
            .unwrap()
            .unwrap();
        (build_router(AppState { db_path }), dir)
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(
            axum::http::Request::get(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    fn post_update(form: &str) -> axum::http::Request<Body> {
        axum::http::Request::post("/update")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn home_lists_groups() {
        let (app, _dir) = test_app();

        for uri in ["/", "/home"] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            let html = body_text(response).await;
            assert!(html.contains("Dairy"));
            assert!(html.contains("href=\"/show/200/\""));
        }
    }

    #[tokio::test]
    async fn show_group_lists_factors() {
        let (app, _dir) = test_app();

        let response = get(app, "/show/100/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("BUTTER,WITHSALT"));
        assert!(html.contains("6.38"));
        assert!(!html.contains("ALLSPICE"));
    }

    #[tokio::test]
    async fn show_group_rejects_non_numeric_id() {
        let (app, _dir) = test_app();

        let response = get(app, "/show/dairy/").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn about_lists_first_page() {
        let (app, _dir) = test_app();

        let response = get(app, "/about/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Butter,salted"));
        assert!(html.contains("Pimentadioica"));
        assert!(html.contains("href=\"/about/1/\""));
        assert!(html.contains("href=\"/about/0/\""));
        assert!(html.contains("/showNutrients/1001-0"));
        assert!(!html.contains("class=\"flash\""));
    }

    #[tokio::test]
    async fn about_past_the_end_is_empty() {
        let (app, _dir) = test_app();

        let response = get(app, "/about/5/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("No foods on this page."));
        assert!(html.contains("href=\"/about/4/\""));
        assert!(html.contains("href=\"/about/6/\""));
    }

    #[tokio::test]
    async fn about_accepts_post() {
        let (app, _dir) = test_app();

        let response = app
            .oneshot(
                axum::http::Request::post("/about/0/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn about_shows_flash_message() {
        let (app, _dir) = test_app();

        let response = get(app, "/about/0/?message=Food%20Updated%20Successfully").await;
        let html = body_text(response).await;
        assert!(html.contains("<div class=\"flash\">Food Updated Successfully</div>"));
    }

    #[tokio::test]
    async fn update_moves_food_and_redirects() {
        let (app, dir) = test_app();

        let response = app
            .oneshot(post_update(
                "id=1001&short_desc=BUTTER&long_desc=Butter%2C+unsalted&manufac_name=Acme\
                 &sci_name=&name=Spices&current_page=3",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/about/3/?message=Food%20Updated%20Successfully"
        );

        let db = Database::connect(&dir.path().join("usda.db")).unwrap();
        let food = db.find_food(1001).unwrap().unwrap();
        assert_eq!(food.food_group_id, 200);
        assert_eq!(food.long_desc, "Butter, unsalted");
        assert_eq!(food.manufac_name, "Acme");
    }

    #[tokio::test]
    async fn update_with_unknown_group_fails() {
        let (app, dir) = test_app();

        let response = app
            .oneshot(post_update(
                "id=1001&short_desc=X&long_desc=X&manufac_name=&sci_name=&name=Nope&current_page=0",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        let html = body_text(response).await;
        assert!(html.contains("<h1>500 Internal Server Error</h1>"));
        assert!(!html.contains("Nope"));

        let db = Database::connect(&dir.path().join("usda.db")).unwrap();
        let food = db.find_food(1001).unwrap().unwrap();
        assert_eq!(food.short_desc, "BUTTER,WITHSALT");
        assert_eq!(food.food_group_id, 100);
    }

    #[tokio::test]
    async fn update_get_redirects_to_listing() {
        let (app, _dir) = test_app();

        let response = get(app, "/update").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/about/");
    }

    #[tokio::test]
    async fn nutrients_page_lists_facts() {
        let (app, _dir) = test_app();

        let response = get(app, "/showNutrients/1001-2").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Protein"));
        assert!(html.contains("0.85"));
        assert!(html.contains("href=\"/about/2/\""));
    }

    #[tokio::test]
    async fn nutrients_for_unknown_food_is_empty() {
        let (app, _dir) = test_app();

        let response = get(app, "/showNutrients/9999-0").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("No nutrition facts recorded"));
    }

    #[tokio::test]
    async fn weights_page_lists_measures() {
        let (app, _dir) = test_app();

        let response = get(app, "/showFoodWeights/1001-0").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("tbsp"));
        assert!(html.contains("14.2"));
    }

    #[tokio::test]
    async fn malformed_food_reference_is_bad_request() {
        let (app, _dir) = test_app();

        for uri in ["/showNutrients/1001", "/showFoodWeights/abc-0", "/showNutrients/1001-x"] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let html = body_text(response).await;
            assert!(html.contains("Invalid food reference"), "{uri}");
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (app, _dir) = test_app();

        let response = get(app, "/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = body_text(response).await;
        assert!(html.contains("<h1>404 Not Found</h1>"));
        assert!(html.contains("No such page"));
    }

    #[tokio::test]
    async fn security_headers_present() {
        let (app, _dir) = test_app();

        let response = get(app, "/home").await;
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert!(
            response
                .headers()
                .get("content-security-policy")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("default-src 'none'")
        );
    }

    #[test]
    fn parse_food_page_splits_on_last_dash() {
        assert!(matches!(parse_food_page("1001-3"), Ok((1001, 3))));
        assert!(parse_food_page("1001").is_err());
        assert!(parse_food_page("-3").is_err());
        assert!(parse_food_page("1001--1").is_err());
    }

    #[test]
    fn percent_encode_message() {
        assert_eq!(
            percent_encode_component(UPDATE_MESSAGE),
            "Food%20Updated%20Successfully"
        );
        assert_eq!(percent_encode_component("a&b=c"), "a%26b%3Dc");
    }
}
