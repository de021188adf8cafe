//! In-process stand-in for the remote content service.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use learn2ux::api::ContentClient;
use learn2ux::server::app::{router, AppState};
use learn2ux::settings::Settings;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@learn2ux.test";
pub const ADMIN_PASSWORD: &str = "secret";
pub const TOKEN: &str = "test-token";

#[derive(Default)]
struct Store {
    categories: Vec<Value>,
    questions: Vec<Value>,
    next_id: usize,
}

impl Store {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn category(&self, id: &str) -> Option<&Value> {
        self.categories.iter().find(|c| c["_id"] == id)
    }

    /// Categories carry a live question count, like the real listing does.
    fn counted(&self, category: &Value) -> Value {
        let mut category = category.clone();
        let count = self
            .questions
            .iter()
            .filter(|q| q["categoryId"] == category["_id"])
            .count();
        category["questionNumber"] = json!(count);
        category
    }

    /// Questions are listed with their category populated, or `null` when it
    /// is gone.
    fn populated(&self, question: &Value) -> Value {
        let mut question = question.clone();
        let populated = question["categoryId"]
            .as_str()
            .and_then(|id| self.category(id))
            .map(|c| json!({ "_id": c["_id"], "titleEn": c["titleEn"], "titleAr": c["titleAr"] }))
            .unwrap_or(Value::Null);
        question["categoryId"] = populated;
        question
    }
}

#[derive(Default)]
struct Shared {
    store: Mutex<Store>,
    fail_reads: AtomicBool,
    echo_created: AtomicBool,
    requests: Mutex<HashMap<String, usize>>,
    last_body: Mutex<Option<Value>>,
}

type FakeState = Arc<Shared>;

pub struct FakeService {
    pub base_url: String,
    shared: FakeState,
}

impl FakeService {
    pub async fn start() -> Self {
        let shared: FakeState = Arc::new(Shared::default());
        shared.echo_created.store(true, Ordering::SeqCst);
        let app = Router::new()
            .route("/api/categories", get(list_categories).post(create_category))
            .route(
                "/api/categories/{id}",
                get(get_category).put(update_category).delete(delete_category),
            )
            .route("/api/questions", get(list_questions).post(create_question))
            .route(
                "/api/questions/{id}",
                axum::routing::put(update_question).delete(delete_question),
            )
            .route("/api/admin/login", post(login))
            .route("/api/admin/register", post(register))
            .with_state(shared.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        Self {
            base_url: format!("http://{addr}/api/"),
            shared,
        }
    }

    pub fn client(&self) -> ContentClient {
        ContentClient::new(&self.base_url, None).unwrap()
    }

    /// The site wired to this service.
    pub fn app(&self) -> Router {
        let settings = Settings::with_api_base_url(self.base_url.clone());
        router(AppState::new(self.client(), settings))
    }

    pub fn fail_reads(&self, fail: bool) {
        self.shared.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Whether created documents are echoed back in `data`.
    pub fn echo_created(&self, echo: bool) {
        self.shared.echo_created.store(echo, Ordering::SeqCst);
    }

    /// Number of requests seen for `"METHOD /path"`.
    pub fn requests(&self, key: &str) -> usize {
        self.shared
            .requests
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or_default()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.shared.last_body.lock().unwrap().clone()
    }

    pub fn categories(&self) -> Vec<Value> {
        self.shared.store.lock().unwrap().categories.clone()
    }

    pub fn questions(&self) -> Vec<Value> {
        self.shared.store.lock().unwrap().questions.clone()
    }

    pub fn seed_category(&self, title_en: &str, title_ar: &str) -> String {
        let mut store = self.shared.store.lock().unwrap();
        let id = store.id("cat");
        store.categories.push(json!({
            "_id": id,
            "titleEn": title_en,
            "titleAr": title_ar,
            "descriptionEn": format!("About {title_en}"),
            "descriptionAr": format!("حول {title_ar}"),
            "textColor": "#5E0535",
            "borderColor": "#D22985",
            "icon": "https://cdn.learn2ux.test/icon.svg",
            "iconType": "svg",
        }));
        id
    }

    pub fn seed_question(&self, category_id: &str, question_en: &str, answer_en: &str) -> String {
        self.seed_question_with_links(category_id, question_en, answer_en, &[])
    }

    pub fn seed_question_with_links(
        &self,
        category_id: &str,
        question_en: &str,
        answer_en: &str,
        links: &[&str],
    ) -> String {
        let mut store = self.shared.store.lock().unwrap();
        let id = store.id("q");
        store.questions.push(json!({
            "_id": id,
            "categoryId": category_id,
            "questionEn": question_en,
            "questionAr": format!("سؤال {question_en}"),
            "answerEn": answer_en,
            "answerAr": "<p>إجابة</p>",
            "links": links,
        }));
        id
    }
}

fn record(shared: &Shared, key: String) {
    *shared.requests.lock().unwrap().entry(key).or_default() += 1;
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn envelope(data: Value, message: Option<&str>) -> Response {
    Json(json!({ "data": data, "message": message })).into_response()
}

fn read_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("{what} not found") })),
    )
        .into_response()
}

async fn list_categories(State(shared): State<FakeState>) -> Response {
    record(&shared, "GET /categories".into());
    if shared.fail_reads.load(Ordering::SeqCst) {
        return read_failure();
    }
    let store = shared.store.lock().unwrap();
    let data: Vec<Value> = store.categories.iter().map(|c| store.counted(c)).collect();
    envelope(json!(data), None)
}

async fn get_category(State(shared): State<FakeState>, Path(id): Path<String>) -> Response {
    record(&shared, "GET /categories/{id}".into());
    if shared.fail_reads.load(Ordering::SeqCst) {
        return read_failure();
    }
    let store = shared.store.lock().unwrap();
    match store.category(&id) {
        Some(category) => envelope(store.counted(category), None),
        None => not_found("Category"),
    }
}

async fn create_category(
    State(shared): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&shared, "POST /categories".into());
    *shared.last_body.lock().unwrap() = Some(body.clone());
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut store = shared.store.lock().unwrap();
    if store.categories.iter().any(|c| c["titleEn"] == body["titleEn"]) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Category already exists" })),
        )
            .into_response();
    }
    let mut category = body;
    category["_id"] = json!(store.id("cat"));
    store.categories.push(category.clone());
    let data = if shared.echo_created.load(Ordering::SeqCst) {
        category
    } else {
        Value::Null
    };
    envelope(data, Some("Category created"))
}

async fn update_category(
    State(shared): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    record(&shared, "PUT /categories/{id}".into());
    *shared.last_body.lock().unwrap() = Some(body.clone());
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut store = shared.store.lock().unwrap();
    let Some(category) = store.categories.iter_mut().find(|c| c["_id"] == id) else {
        return not_found("Category");
    };
    let mut updated = body;
    updated["_id"] = json!(id);
    *category = updated.clone();
    envelope(updated, None)
}

async fn delete_category(
    State(shared): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record(&shared, "DELETE /categories/{id}".into());
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut store = shared.store.lock().unwrap();
    let before = store.categories.len();
    store.categories.retain(|c| c["_id"] != id);
    if store.categories.len() == before {
        return not_found("Category");
    }
    envelope(Value::Null, Some("Category removed"))
}

async fn list_questions(State(shared): State<FakeState>, headers: HeaderMap) -> Response {
    let key = if authorized(&headers) {
        "GET /questions (admin)"
    } else {
        "GET /questions"
    };
    record(&shared, key.into());
    if shared.fail_reads.load(Ordering::SeqCst) {
        return read_failure();
    }
    let store = shared.store.lock().unwrap();
    let data: Vec<Value> = store.questions.iter().map(|q| store.populated(q)).collect();
    envelope(json!(data), None)
}

async fn create_question(
    State(shared): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&shared, "POST /questions".into());
    *shared.last_body.lock().unwrap() = Some(body.clone());
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut store = shared.store.lock().unwrap();
    let mut question = body;
    question["_id"] = json!(store.id("q"));
    if question.get("links").is_none() {
        question["links"] = json!([]);
    }
    store.questions.push(question.clone());
    envelope(question, None)
}

async fn update_question(
    State(shared): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    record(&shared, "PUT /questions/{id}".into());
    *shared.last_body.lock().unwrap() = Some(body.clone());
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut store = shared.store.lock().unwrap();
    let Some(question) = store.questions.iter_mut().find(|q| q["_id"] == id) else {
        return not_found("Question");
    };
    let mut updated = body;
    updated["_id"] = json!(id);
    *question = updated.clone();
    envelope(updated, Some("Question saved"))
}

async fn delete_question(
    State(shared): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    record(&shared, "DELETE /questions/{id}".into());
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut store = shared.store.lock().unwrap();
    store.questions.retain(|q| q["_id"] != id);
    envelope(Value::Null, None)
}

async fn login(State(shared): State<FakeState>, Json(body): Json<Value>) -> Response {
    record(&shared, "POST /admin/login".into());
    if body["email"] == ADMIN_EMAIL && body["password"] == ADMIN_PASSWORD {
        envelope(json!({ "token": TOKEN }), Some("Logged in"))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn register(State(shared): State<FakeState>, Json(body): Json<Value>) -> Response {
    record(&shared, "POST /admin/register".into());
    *shared.last_body.lock().unwrap() = Some(body);
    envelope(Value::Null, None)
}

/// Response of the site as seen by a browser.
pub struct Page {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Page {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Page {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Page {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn get_page(app: Router, uri: &str, cookie: Option<&str>) -> Page {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    send(app, request.body(Body::empty()).unwrap()).await
}

pub async fn post_form(app: Router, uri: &str, cookie: Option<&str>, body: &str) -> Page {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    send(app, request.body(Body::from(body.to_owned())).unwrap()).await
}

pub const BOUNDARY: &str = "learn2ux-test-boundary";

/// Minimal multipart/form-data body builder.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

pub async fn post_multipart(app: Router, uri: &str, cookie: Option<&str>, form: Multipart) -> Page {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    send(app, request.body(Body::from(form.finish())).unwrap()).await
}

pub fn admin_cookie() -> String {
    format!("adminToken={TOKEN}")
}
