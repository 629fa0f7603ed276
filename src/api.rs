//! HTTP client for the CodeQuest server.
//!
//! The server is a Django app: session cookies plus a `csrftoken` cookie
//! that must be echoed back as an `X-CSRFToken` header on every mutating
//! request. The cookie jar is shared with reqwest so the token survives
//! rotation mid-session.
//!
//! Request/response bodies are the wire types in [`crate::protocol`].
//! Application errors arrive as `{"error": "..."}` with assorted status
//! codes, so bodies are inspected before status.

use std::sync::Arc;
use std::sync::mpsc::SyncSender;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::protocol::{
    AssignRequest, CreateGroupRequest, GroupsResponse, Language, MessageResponse, Question,
    RunReport, StudentsResponse, SubmitRequest, SubmitResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";

/// One completed request, delivered to the frame loop. Payloads are reduced
/// to `Result<T, String>` because the UI only ever renders the message.
#[derive(Debug)]
pub enum ApiEvent {
    Groups(Result<GroupsResponse, String>),
    GroupCreated(Result<MessageResponse, String>),
    Students(Result<StudentsResponse, String>),
    StudentAssigned(Result<MessageResponse, String>),
    Question(Result<Question, String>),
    RunResult(Result<RunReport, String>),
    SubmitResult(Result<SubmitResponse, String>),
}

pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
}

impl ApiClient {
    /// `base` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base: &str) -> Result<Self> {
        let mut base: Url = base.parse().with_context(|| format!("invalid server url {base:?}"))?;
        // Url::join treats a path without a trailing slash as a file.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building http client")?;
        Ok(Self { http, jar, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("joining endpoint {path:?}"))
    }

    /// Current CSRF token from the jar, if the server has issued one.
    fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let header = header.to_str().ok()?;
        cookie_value(header, CSRF_COOKIE)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(target: "api", "GET {url}");
        let resp = self.http.get(url).send().await?;
        parse_body(resp).await
    }

    async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(target: "api", "POST {url}");
        let mut req = self.http.post(url).json(body);
        if let Some(token) = self.csrf_token() {
            req = req.header(CSRF_HEADER, token);
        }
        let resp = req.send().await?;
        parse_body(resp).await
    }

    pub async fn groups(&self) -> Result<GroupsResponse> {
        self.get_json("faculty/groups/").await
    }

    pub async fn create_group(&self, name: &str) -> Result<MessageResponse> {
        let body = CreateGroupRequest {
            name: name.to_string(),
        };
        self.post_json("faculty/groups/create/", &body).await
    }

    pub async fn students(&self) -> Result<StudentsResponse> {
        self.get_json("faculty/students/").await
    }

    pub async fn assign_student(
        &self,
        student_id: i64,
        group_id: Option<i64>,
    ) -> Result<MessageResponse> {
        let body = AssignRequest {
            student_id,
            group_id,
        };
        self.post_json("faculty/students/assign/", &body).await
    }

    pub async fn question(&self, id: i64) -> Result<Question> {
        self.get_json(&format!("student/question/{id}/")).await
    }

    pub async fn submit(
        &self,
        question_id: i64,
        code: &str,
        language: Language,
    ) -> Result<SubmitResponse> {
        let body = SubmitRequest {
            code: code.to_string(),
            language: language.wire_name().to_string(),
        };
        self.post_json(&format!("student/submit/{question_id}/"), &body)
            .await
    }

    /// Ad-hoc run against a single input/expected pair. This endpoint takes
    /// a multipart form rather than JSON.
    pub async fn run_code(
        &self,
        code: &str,
        language: Language,
        input: &str,
        expected: &str,
    ) -> Result<RunReport> {
        let url = self.endpoint("student/run_code/")?;
        debug!(target: "api", "POST {url} (multipart)");
        let form = run_code_fields(code, language, input, expected)
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value));
        let mut req = self.http.post(url).multipart(form);
        if let Some(token) = self.csrf_token() {
            req = req.header(CSRF_HEADER, token);
        }
        let resp = req.send().await?;
        parse_body(resp).await
    }
}

/// Form fields for the run endpoint, keyed exactly as the server reads them.
fn run_code_fields(
    code: &str,
    language: Language,
    input: &str,
    expected: &str,
) -> [(&'static str, String); 4] {
    [
        ("code", code.to_string()),
        ("language", language.wire_name().to_string()),
        ("input", input.to_string()),
        ("expected", expected.to_string()),
    ]
}

/// Decode a response body, preferring an `{"error": ...}` envelope over the
/// HTTP status so server-side messages reach the user verbatim.
async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let text = resp.text().await.context("reading response body")?;

    #[derive(serde::Deserialize)]
    struct ErrorEnvelope {
        error: String,
    }
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
        return Err(anyhow!(envelope.error));
    }
    if !status.is_success() {
        return Err(anyhow!("server returned {status}"));
    }
    serde_json::from_str(&text).with_context(|| format!("decoding response: {text:.120}"))
}

/// Extract a named cookie's value from a `Cookie:`-style header string.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

/// Cloneable handle the state machines' effects are executed through. Each
/// call spawns onto the runtime and reports back on the frame channel.
#[derive(Clone)]
pub struct ApiHandle {
    client: Arc<ApiClient>,
    runtime: tokio::runtime::Handle,
    tx: SyncSender<ApiEvent>,
}

impl ApiHandle {
    pub fn new(
        client: Arc<ApiClient>,
        runtime: tokio::runtime::Handle,
        tx: SyncSender<ApiEvent>,
    ) -> Self {
        Self {
            client,
            runtime,
            tx,
        }
    }

    fn deliver(tx: &SyncSender<ApiEvent>, event: ApiEvent) {
        if tx.try_send(event).is_err() {
            warn!(target: "api", "frame channel full, dropping api event");
        }
    }

    pub fn fetch_groups(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.groups().await.map_err(|e| e.to_string());
            Self::deliver(&tx, ApiEvent::Groups(result));
        });
    }

    pub fn create_group(&self, name: String) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.create_group(&name).await.map_err(|e| e.to_string());
            Self::deliver(&tx, ApiEvent::GroupCreated(result));
        });
    }

    pub fn fetch_students(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.students().await.map_err(|e| e.to_string());
            Self::deliver(&tx, ApiEvent::Students(result));
        });
    }

    pub fn assign_student(&self, student_id: i64, group_id: Option<i64>) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client
                .assign_student(student_id, group_id)
                .await
                .map_err(|e| e.to_string());
            Self::deliver(&tx, ApiEvent::StudentAssigned(result));
        });
    }

    pub fn fetch_question(&self, id: i64) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.question(id).await.map_err(|e| e.to_string());
            Self::deliver(&tx, ApiEvent::Question(result));
        });
    }

    pub fn submit(&self, question_id: i64, code: String, language: Language) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client
                .submit(question_id, &code, language)
                .await
                .map_err(|e| e.to_string());
            Self::deliver(&tx, ApiEvent::SubmitResult(result));
        });
    }

    pub fn run_code(&self, code: String, language: Language, input: String, expected: String) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client
                .run_code(&code, language, &input, &expected)
                .await
                .map_err(|e| e.to_string());
            Self::deliver(&tx, ApiEvent::RunResult(result));
        });
    }
}
