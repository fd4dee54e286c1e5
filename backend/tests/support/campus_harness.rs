//! Server harness and shared world for the campus behaviour suites.
//!
//! The harness owns a single-threaded Tokio runtime plus a `LocalSet` because
//! Actix uses `spawn_local` internally. The server runs over the in-memory
//! store with uploads in a temporary directory, and every named actor keeps
//! its own session cookie and anti-forgery token. `WorldFixture` stops the
//! server even if a step panics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::net::TcpListener;
use std::rc::Rc;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::ServerHandle;
use actix_web::http::{Method, header};
use actix_web::{App, HttpServer, web};
use awc::Client;
use campus_clubs::Trace;
use campus_clubs::domain::{Email, Password, TRACE_ID_HEADER};
use campus_clubs::inbound::http::state::{HttpState, Repositories, ServiceLimits};
use campus_clubs::inbound::http::{configure, extractor_configs};
use campus_clubs::middleware::{CSRF_HEADER, Csrf, RoleGate};
use campus_clubs::outbound::credentials::Argon2CredentialHasher;
use campus_clubs::outbound::media::DirectoryMediaStorage;
use campus_clubs::outbound::memory::MemoryStore;
use mockable::DefaultClock;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

pub(crate) const ROOT_EMAIL: &str = "root@campus.example";
pub(crate) const ROOT_PASSWORD: &str = "bootstrap-secret";
/// Small enough that a few kilobytes of image trip the upload limit.
pub(crate) const MAX_UPLOAD_BYTES: u64 = 1024;

/// Cookie and token a named actor presents.
#[derive(Debug, Clone, Default)]
pub(crate) struct Actor {
    cookie: Option<String>,
    csrf: Option<String>,
}

/// Outcome of one request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) body: Value,
    pub(crate) raw: Vec<u8>,
    pub(crate) content_type: Option<String>,
    pub(crate) cache_control: Option<String>,
    pub(crate) trace_id: Option<String>,
}

pub(crate) struct CampusWorld {
    pub(crate) runtime: Runtime,
    pub(crate) local: LocalSet,
    pub(crate) base_url: String,
    pub(crate) server: ServerHandle,
    actors: HashMap<String, Actor>,
    ids: HashMap<String, String>,
    pub(crate) last: Option<Reply>,
    _uploads: TempDir,
}

pub(crate) type SharedWorld = Rc<RefCell<CampusWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        shutdown(self.world.clone());
    }
}

pub(crate) fn shutdown(world: SharedWorld) {
    // `LocalSet` must be driven on the thread that owns it, so we hold the
    // world while calling `block_on`. The future must not touch the world.
    let ctx = world.borrow();
    let server = ctx.server.clone();
    ctx.local.block_on(&ctx.runtime, async move {
        server.stop(true).await;
    });
}

pub(crate) fn with_world_async<R, F>(world: &SharedWorld, operation: impl FnOnce(String) -> F) -> R
where
    F: std::future::Future<Output = R>,
{
    let ctx = world.borrow();
    let base_url = ctx.base_url.clone();
    ctx.local.block_on(&ctx.runtime, operation(base_url))
}

fn test_session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(PersistentSession::default().session_ttl(CookieDuration::hours(2)))
        .build()
}

fn build_state(uploads: &TempDir) -> HttpState {
    let store = Arc::new(MemoryStore::new());
    let media = DirectoryMediaStorage::open(uploads.path()).expect("media storage");
    let repositories = Repositories {
        users: store.clone(),
        universities: store.clone(),
        clubs: store.clone(),
        memberships: store.clone(),
        applications: store.clone(),
        notifications: store.clone(),
        posts: store,
        media: Arc::new(media),
        hasher: Arc::new(Argon2CredentialHasher::with_cost(64, 1).expect("argon2 params")),
        clock: Arc::new(DefaultClock),
    };
    HttpState::from_repositories(
        repositories,
        ServiceLimits {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            ..ServiceLimits::default()
        },
    )
}

async fn spawn_campus_server(state: web::Data<HttpState>) -> Result<(String, ServerHandle), String> {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;

    let server = HttpServer::new(move || {
        let (json, query, path) = extractor_configs(state.json_body_limit());
        App::new()
            .app_data(state.clone())
            .app_data(json)
            .app_data(query)
            .app_data(path)
            .wrap(Csrf)
            .wrap(RoleGate)
            .wrap(test_session_middleware(key.clone()))
            .wrap(Trace)
            .configure(configure)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .map_err(|err| err.to_string())?
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    Ok((format!("http://{addr}"), handle))
}

fn create_runtime_and_local() -> (Runtime, LocalSet) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    let local = LocalSet::new();

    (runtime, local)
}

pub(crate) fn world() -> WorldFixture {
    let (runtime, local) = create_runtime_and_local();
    let uploads = tempfile::tempdir().expect("uploads dir");
    let state = web::Data::new(build_state(&uploads));

    let (base_url, server) = local.block_on(&runtime, async {
        let email = Email::parse(ROOT_EMAIL).expect("root email");
        let password = Password::new_secret(ROOT_PASSWORD).expect("root password");
        state
            .accounts
            .bootstrap_admin(&email, &password)
            .await
            .expect("bootstrap admin");
        spawn_campus_server(state.clone())
            .await
            .expect("spawn campus server")
    });

    WorldFixture {
        world: Rc::new(RefCell::new(CampusWorld {
            runtime,
            local,
            base_url,
            server,
            actors: HashMap::new(),
            ids: HashMap::new(),
            last: None,
            _uploads: uploads,
        })),
    }
}

/// A request to send on behalf of an actor.
pub(crate) struct Call<'a> {
    method: Method,
    path: &'a str,
    payload: Option<Value>,
}

impl<'a> Call<'a> {
    pub(crate) fn get(path: &'a str) -> Self {
        Self {
            method: Method::GET,
            path,
            payload: None,
        }
    }

    pub(crate) fn post(path: &'a str, payload: Value) -> Self {
        Self {
            method: Method::POST,
            path,
            payload: Some(payload),
        }
    }

    pub(crate) fn post_empty(path: &'a str) -> Self {
        Self {
            method: Method::POST,
            path,
            payload: None,
        }
    }

    pub(crate) fn delete(path: &'a str) -> Self {
        Self {
            method: Method::DELETE,
            path,
            payload: None,
        }
    }
}

fn header_value(headers: &header::HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn session_pair(headers: &header::HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}

fn perform(world: &SharedWorld, actor: Option<&str>, call: Call<'_>, send_csrf: bool) -> Reply {
    let session = actor
        .map(|name| world.borrow().actors.get(name).cloned().unwrap_or_default())
        .unwrap_or_default();
    let cookie = session.cookie;
    let csrf = session.csrf.filter(|_| send_csrf);
    let Call {
        method,
        path,
        payload,
    } = call;

    let (reply, set_cookie) = with_world_async(world, |base_url| async move {
        let mut request = Client::default().request(method, format!("{base_url}{path}"));
        if let Some(cookie) = cookie {
            request = request.insert_header((header::COOKIE, cookie));
        }
        if let Some(token) = csrf {
            request = request.insert_header((CSRF_HEADER, token));
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await,
            None => request.send().await,
        }
        .expect("campus request");

        let headers = response.headers().clone();
        let raw = response
            .body()
            .limit(1024 * 1024)
            .await
            .expect("response body")
            .to_vec();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
        let reply = Reply {
            status: response.status().as_u16(),
            body,
            raw,
            content_type: header_value(&headers, header::CONTENT_TYPE),
            cache_control: header_value(&headers, header::CACHE_CONTROL),
            trace_id: header_value(&headers, TRACE_ID_HEADER),
        };
        (reply, session_pair(&headers))
    });

    let mut ctx = world.borrow_mut();
    if let (Some(name), Some(cookie)) = (actor, set_cookie) {
        ctx.actors.entry(name.to_owned()).or_default().cookie = Some(cookie);
    }
    ctx.last = Some(reply.clone());
    reply
}

/// Send `call` as `actor`, presenting their anti-forgery token.
pub(crate) fn send(world: &SharedWorld, actor: Option<&str>, call: Call<'_>) -> Reply {
    perform(world, actor, call, true)
}

/// Send `call` as `actor` with the session cookie but no token header.
pub(crate) fn send_without_token(world: &SharedWorld, actor: &str, call: Call<'_>) -> Reply {
    perform(world, Some(actor), call, false)
}

/// Fetch an anti-forgery token for `actor`.
pub(crate) fn issue_token(world: &SharedWorld, actor: &str) {
    let reply = send(world, Some(actor), Call::get("/csrf"));
    assert_eq!(reply.status, 200, "csrf token request");
    let token = reply.body["token"].as_str().expect("csrf token").to_owned();
    world
        .borrow_mut()
        .actors
        .entry(actor.to_owned())
        .or_default()
        .csrf = Some(token);
}

/// Sign `actor` in with a password.
pub(crate) fn sign_in(world: &SharedWorld, actor: &str, email: &str, password: &str) -> Reply {
    issue_token(world, actor);
    send(
        world,
        Some(actor),
        Call::post("/login", json!({ "email": email, "password": password })),
    )
}

/// Register `actor` as a student and keep them signed in.
pub(crate) fn sign_up(world: &SharedWorld, actor: &str, email: &str, university: &str) -> Reply {
    issue_token(world, actor);
    let reply = send(
        world,
        Some(actor),
        Call::post(
            "/signup",
            json!({ "email": email, "password": "correct horse", "universityId": university }),
        ),
    );
    assert_eq!(reply.status, 201, "signup: {}", reply.body);
    reply
}

/// Remember an identifier under a scenario-level name.
pub(crate) fn remember(world: &SharedWorld, name: &str, id: &str) {
    world
        .borrow_mut()
        .ids
        .insert(name.to_owned(), id.to_owned());
}

/// An identifier remembered earlier in the scenario.
pub(crate) fn recall(world: &SharedWorld, name: &str) -> String {
    world
        .borrow()
        .ids
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("no {name} recorded"))
}

/// The most recent reply.
pub(crate) fn last_reply(world: &SharedWorld) -> Reply {
    world.borrow().last.clone().expect("a request was sent")
}
