use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::bail;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use axum_extra::extract::cookie::Key;
use chrono::Utc;
use http_body_util::BodyExt;
use jz_api::{
    ApiConfig, ApiState,
    auth::jwt::{AUTH_COOKIE, generate_jwt_token},
    config::Environment,
    router::router,
    session::{SESSION_COOKIE, SessionStore},
    store::Store,
};
use jz_db::models::{Event, NewEvent, NewScore, NewTopic, ScoreEntry, ScoreFilter, Topic};
use jz_quiz::questions::shuffle_pool;
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_jwt_secret_minimum_32_characters_long";
pub const COOKIE_SECRET: &str =
    "test_cookie_secret_minimum_64_characters_long_for_secure_encryption";

pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        cookie_secret: COOKIE_SECRET.to_string(),
        env: Environment::Development,
        port: 3000,
        db_max_connections: 1,
        session_ttl_minutes: 120,
        metrics_enabled: false,
    }
}

#[derive(Default)]
struct Tables {
    topics: Vec<Topic>,
    events: Vec<Event>,
    scores: Vec<ScoreEntry>,
    users: BTreeMap<Uuid, String>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn with_counts(&self, topic: &Topic) -> Topic {
        Topic {
            events_count: self.events.iter().filter(|e| e.topic_id == topic.id).count() as i64,
            scores_count: self.scores.iter().filter(|s| s.topic_id == topic.id).count() as i64,
            ..topic.clone()
        }
    }

    fn filtered_scores(&self, topic_id: Option<i64>, user_id: Option<Uuid>) -> Vec<ScoreEntry> {
        let mut scores: Vec<ScoreEntry> = self
            .scores
            .iter()
            .filter(|s| topic_id.is_none_or(|t| s.topic_id == t))
            .filter(|s| user_id.is_none_or(|u| s.user_id == u))
            .cloned()
            .collect();
        scores.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(a.date.cmp(&b.date))
                .then(a.id.cmp(&b.id))
        });
        scores
    }

    fn page(
        &self,
        topic_id: Option<i64>,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Vec<ScoreEntry> {
        self.filtered_scores(topic_id, user_id)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect()
    }
}

/// Seed of the random source shuffling quiz pools
pub const SHUFFLE_SEED: u64 = 1918;

/// In-memory store; quiz pools are shuffled with a seeded random source so
/// runs are repeatable.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_scores: AtomicBool,
    rng: Mutex<StdRng>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::default(),
            fail_scores: AtomicBool::new(false),
            rng: Mutex::new(StdRng::seed_from_u64(SHUFFLE_SEED)),
        }
    }

    pub async fn add_user(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.write().await.users.insert(id, username.to_string());
        id
    }

    /// Seed a topic with events of the given titles and years
    pub async fn add_topic(&self, title: &str, events: &[(&str, i32)]) -> i64 {
        let start_year = events.iter().map(|(_, y)| *y).min().unwrap_or(1900);
        let end_year = events.iter().map(|(_, y)| *y).max().unwrap_or(1900);

        let topic = self
            .create_topic(NewTopic {
                title: title.to_string(),
                start_year,
                end_year,
                description: String::new(),
            })
            .await
            .unwrap();

        for (title, year) in events {
            self.create_event(NewEvent {
                topic_id: topic.id,
                title: title.to_string(),
                year: *year,
                date: None,
            })
            .await
            .unwrap();
        }

        topic.id
    }

    /// Make every score operation fail until switched off again
    pub fn set_fail_scores(&self, fail: bool) {
        self.fail_scores.store(fail, Ordering::SeqCst);
    }

    pub async fn score_count(&self) -> usize {
        self.tables.read().await.scores.len()
    }

    fn check_scores(&self) -> anyhow::Result<()> {
        if self.fail_scores.load(Ordering::SeqCst) {
            bail!("error getting scores: connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn topic(&self, topic_id: i64) -> anyhow::Result<Option<Topic>> {
        let tables = self.tables.read().await;
        Ok(tables
            .topics
            .iter()
            .find(|t| t.id == topic_id)
            .map(|t| tables.with_counts(t)))
    }

    async fn topics(&self) -> anyhow::Result<Vec<Topic>> {
        let tables = self.tables.read().await;
        let mut topics: Vec<Topic> = tables.topics.iter().map(|t| tables.with_counts(t)).collect();
        topics.sort_by_key(|t| (t.start_year, t.id));
        Ok(topics)
    }

    async fn events_by_topic(&self, topic_id: i64, shuffle: bool) -> anyhow::Result<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .events
            .iter()
            .filter(|e| e.topic_id == topic_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.year, e.date, e.id));
        if shuffle {
            shuffle_pool(&mut events, &mut *self.rng.lock().unwrap());
        }
        Ok(events)
    }

    async fn create_topic(&self, topic: NewTopic) -> anyhow::Result<Topic> {
        let mut tables = self.tables.write().await;
        let topic = Topic {
            id: tables.next_id(),
            title: topic.title,
            start_year: topic.start_year,
            end_year: topic.end_year,
            description: topic.description,
            events_count: 0,
            scores_count: 0,
        };
        tables.topics.push(topic.clone());
        Ok(topic)
    }

    async fn delete_topic(&self, topic_id: i64) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.topics.len();
        tables.topics.retain(|t| t.id != topic_id);
        tables.events.retain(|e| e.topic_id != topic_id);
        tables.scores.retain(|s| s.topic_id != topic_id);
        Ok(tables.topics.len() < before)
    }

    async fn create_event(&self, event: NewEvent) -> anyhow::Result<Event> {
        let mut tables = self.tables.write().await;
        let event = Event {
            id: tables.next_id(),
            topic_id: event.topic_id,
            title: event.title,
            year: event.year,
            date: event.date,
        };
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn delete_event(&self, topic_id: i64, event_id: i64) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.events.len();
        tables
            .events
            .retain(|e| !(e.topic_id == topic_id && e.id == event_id));
        Ok(tables.events.len() < before)
    }

    async fn create_score(&self, score: NewScore) -> anyhow::Result<()> {
        self.check_scores()?;
        let mut tables = self.tables.write().await;
        let Some(topic_title) = tables
            .topics
            .iter()
            .find(|t| t.id == score.topic_id)
            .map(|t| t.title.clone())
        else {
            bail!("topic {} does not exist", score.topic_id);
        };
        let username = tables
            .users
            .get(&score.user_id)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let id = tables.next_id();
        tables.scores.push(ScoreEntry {
            id,
            topic_id: score.topic_id,
            topic_title,
            user_id: score.user_id,
            username,
            points: score.points,
            date: Utc::now(),
        });
        Ok(())
    }

    async fn scores(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<ScoreEntry>> {
        self.check_scores()?;
        Ok(self.tables.read().await.page(None, None, limit, offset))
    }

    async fn scores_by_topic(
        &self,
        topic_id: i64,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        self.check_scores()?;
        Ok(self
            .tables
            .read()
            .await
            .page(Some(topic_id), None, limit, offset))
    }

    async fn scores_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        self.check_scores()?;
        Ok(self
            .tables
            .read()
            .await
            .page(None, Some(user_id), limit, offset))
    }

    async fn scores_by_topic_and_user(
        &self,
        topic_id: i64,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ScoreEntry>> {
        self.check_scores()?;
        Ok(self
            .tables
            .read()
            .await
            .page(Some(topic_id), Some(user_id), limit, offset))
    }

    async fn count_scores(&self, filter: ScoreFilter) -> anyhow::Result<i64> {
        self.check_scores()?;
        Ok(self
            .tables
            .read()
            .await
            .filtered_scores(filter.topic_id, filter.user_id)
            .len() as i64)
    }

    async fn topic_points(&self, topic_id: i64) -> anyhow::Result<Vec<i32>> {
        self.check_scores()?;
        Ok(self
            .tables
            .read()
            .await
            .filtered_scores(Some(topic_id), None)
            .iter()
            .map(|s| s.points)
            .collect())
    }
}

/// A running app on top of a [`MemoryStore`]
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: ApiState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(chrono::Duration::minutes(120));
        let state = ApiState::new(&test_config(), store.clone(), sessions, None)
            .expect("Failed to build test state");

        Self {
            store,
            router: router(state.clone()),
            state,
        }
    }

    /// A client without any cookies
    pub fn client(&self) -> TestClient {
        TestClient::new(self.router.clone(), self.state.cookie_key.clone())
    }

    /// A client logged in as a fresh user
    pub async fn player(&self, username: &str) -> (TestClient, Uuid) {
        let user_id = self.store.add_user(username).await;
        let client = self.client();
        client.login(user_id, username, false);
        (client, user_id)
    }

    pub async fn admin(&self) -> TestClient {
        let user_id = self.store.add_user("admin").await;
        let client = self.client();
        client.login(user_id, "admin", true);
        client
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Percent-encode a value for an `application/x-www-form-urlencoded` body
fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-_.~".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}

/// Browser-like client keeping the cookies it is handed between requests
pub struct TestClient {
    router: Router,
    cookie_key: Key,
    cookies: Mutex<BTreeMap<String, String>>,
}

impl TestClient {
    pub fn new(router: Router, cookie_key: Key) -> Self {
        Self {
            router,
            cookie_key,
            cookies: Mutex::new(BTreeMap::new()),
        }
    }

    fn raw_key(&self) -> cookie::Key {
        cookie::Key::try_from(self.cookie_key.master()).expect("Invalid key")
    }

    /// Store an encrypted auth cookie carrying a freshly signed JWT
    pub fn login(&self, user_id: Uuid, username: &str, admin: bool) {
        let token = generate_jwt_token(user_id, username, admin, JWT_SECRET, 24)
            .expect("Failed to sign token");

        let mut jar = cookie::CookieJar::new();
        jar.private_mut(&self.raw_key())
            .add(cookie::Cookie::new(AUTH_COOKIE, token));
        let encrypted = jar.get(AUTH_COOKIE).expect("Cookie should exist");

        self.cookies
            .lock()
            .unwrap()
            .insert(AUTH_COOKIE.to_string(), encrypted.value().to_string());
    }

    /// Id of the session the server handed out, if any
    pub fn session_id(&self) -> Option<Uuid> {
        let value = self.cookies.lock().unwrap().get(SESSION_COOKIE).cloned()?;

        // The server percent-encodes the value when setting it
        let original = cookie::Cookie::parse_encoded(format!("{SESSION_COOKIE}={value}")).ok()?;
        let mut jar = cookie::CookieJar::new();
        jar.add_original(original.into_owned());
        let decrypted = jar.private(&self.raw_key()).get(SESSION_COOKIE)?;
        Uuid::parse_str(decrypted.value()).ok()
    }

    fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.lock().unwrap();
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let parsed = value
                .to_str()
                .ok()
                .and_then(|raw| cookie::Cookie::parse(raw.to_string()).ok());
            if let Some(cookie) = parsed {
                self.cookies
                    .lock()
                    .unwrap()
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match self.cookie_header() {
            Some(cookies) => builder.header(header::COOKIE, cookies),
            None => builder,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = self
            .builder("GET", uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a POST request with a url-encoded form body
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Failed to build request");

        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }

    /// Assert a `302 Found` to `location`
    pub fn assert_redirect(&self, location: &str) {
        self.assert_status(StatusCode::FOUND);
        assert_eq!(self.location(), Some(location));
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}
