mod api;

use anyhow::{Context, Result};
use api::{ApiResponse, AppState, Reply};
use env_logger::{Builder, Env};
use mafia_data::{load_catalog_or_builtin, load_table_rules, normalize_locale};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

const DEFAULT_ADDR: &str = "0.0.0.0:7878";
const SESSION_HEADER: &str = "X-Mafia-Session";
const LANG_HEADER: &str = "X-Mafia-Lang";

fn main() -> Result<()> {
    init_logger();
    let addr = std::env::var("MAFIA_WEB_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let state = Arc::new(Mutex::new(build_state()?));
    let server = Server::http(&addr)
        .map_err(|err| anyhow::anyhow!("start server on {addr}: {err}"))?;
    log::info!("mafia web companion on http://{addr}");
    for request in server.incoming_requests() {
        let state = state.clone();
        if let Err(err) = handle_request(request, state) {
            log::warn!("request error: {err:#}");
        }
    }
    Ok(())
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

fn build_state() -> Result<AppState> {
    let assets = Path::new("assets");
    let mut catalogs = HashMap::new();
    for locale in ["en_US", "fa_IR"] {
        let catalog =
            load_catalog_or_builtin(assets, Some(locale)).context("load role catalog")?;
        catalogs.insert(locale.to_string(), catalog);
    }
    let rules = load_table_rules(assets).context("load table rules")?;
    let seed = std::env::var("MAFIA_SEED")
        .ok()
        .and_then(|value| value.parse::<u64>().ok());
    Ok(AppState::new(catalogs, rules, seed))
}

fn handle_request(mut request: Request, state: Arc<Mutex<AppState>>) -> Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or_default().to_string();
    let method = request.method().clone();
    log::debug!("{method} {path}");
    match (&method, path.as_str()) {
        (&Method::Get, "/") => {
            respond_with_file(request, web_path("index.html"), "text/html; charset=utf-8")?;
        }
        (&Method::Get, "/night.mp3") => {
            let track = web_path("night.mp3");
            if track.is_file() {
                respond_with_file(request, track, "audio/mpeg")?;
            } else {
                request
                    .respond(Response::empty(StatusCode(404)))
                    .context("send 404")?;
            }
        }
        (_, route) if route.starts_with("/api/") => {
            let Some(session) = header_value(&request, SESSION_HEADER) else {
                let reply = Reply {
                    status: 400,
                    body: ApiResponse {
                        ok: false,
                        error: Some(format!("missing {SESSION_HEADER} header")),
                        data: serde_json::Value::Null,
                        events: Vec::new(),
                    },
                };
                return respond_json(request, reply);
            };
            let locale = normalize_locale(header_value(&request, LANG_HEADER).as_deref());
            let mut body = String::new();
            request
                .as_reader()
                .read_to_string(&mut body)
                .context("read request body")?;
            let reply = {
                let mut guard = state
                    .lock()
                    .map_err(|_| anyhow::anyhow!("state lock poisoned"))?;
                guard.handle_api(&method, route, &session, &locale, &body)
            };
            if let Some(err) = reply.body.error.as_deref() {
                log::debug!("{method} {route} -> {}: {err}", reply.status);
            }
            respond_json(request, reply)?;
        }
        _ => {
            request
                .respond(Response::empty(StatusCode(404)))
                .context("send 404")?;
        }
    }
    Ok(())
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

fn web_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("web")
        .join(file)
}

fn respond_with_file(request: Request, path: PathBuf, content_type: &str) -> Result<()> {
    let content = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
    let header = Header::from_bytes(&b"Content-Type"[..], content_type)
        .map_err(|_| anyhow::anyhow!("bad content type {content_type}"))?;
    request
        .respond(Response::from_data(content).with_header(header))
        .context("send file")?;
    Ok(())
}

fn respond_json(request: Request, reply: Reply) -> Result<()> {
    let body = serde_json::to_vec_pretty(&reply.body).context("encode response")?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| anyhow::anyhow!("bad content type"))?;
    let response = Response::from_data(body)
        .with_header(header)
        .with_status_code(StatusCode(reply.status));
    request.respond(response).context("send json")?;
    Ok(())
}
