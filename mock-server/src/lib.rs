use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const EXPIRE_UNITS: [&str; 7] = ["ns", "us", "ms", "s", "m", "h", "d"];

/// Form body of `POST /paste/new`. Every field is optional on the wire so
/// missing ones can be rejected with a 400 and a readable reason.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewPaste {
    pub text: Option<String>,
    pub password: Option<String>,
    pub expire: Option<String>,
    pub lang: Option<String>,
}

/// Knobs for behaviors that differ between GhostBin deployments.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    /// ghostbin.com answers `/paste/{id}/raw` with an error.
    pub raw_enabled: bool,
    pub languages: serde_json::Value,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            raw_enabled: true,
            languages: default_languages(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Paste text by id.
    pastes: Arc<RwLock<HashMap<String, String>>>,
    options: Arc<ServerOptions>,
}

/// A small slice of the public instance's `/languages.json`.
pub fn default_languages() -> serde_json::Value {
    json!([
        {
            "name": "Plain",
            "languages": [
                {"id": "text", "name": "Plain Text"},
                {"id": "irc", "name": "IRC Log"}
            ]
        },
        {
            "name": "Scripting",
            "languages": [
                {"id": "python3", "name": "Python 3", "alt_ids": ["py3"]},
                {"id": "bash", "name": "Bash", "alt_ids": ["sh", "shell"]}
            ]
        },
        {
            "name": "Systems",
            "languages": [
                {"id": "rust", "name": "Rust", "alt_ids": ["rs"]},
                {"id": "c", "name": "C"}
            ]
        }
    ])
}

pub fn app() -> Router {
    app_with(ServerOptions::default())
}

pub fn app_with(options: ServerOptions) -> Router {
    let state = AppState {
        pastes: Arc::new(RwLock::new(HashMap::new())),
        options: Arc::new(options),
    };
    Router::new()
        .route("/paste/new", post(new_paste))
        .route("/paste/{id}/raw", get(raw_paste))
        .route("/languages.json", get(languages))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, ServerOptions::default()).await
}

pub async fn run_with(listener: TcpListener, options: ServerOptions) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

/// `\d+(ns|us|ms|s|m|h|d)`
pub fn is_valid_expire(expire: &str) -> bool {
    let digits = expire.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && EXPIRE_UNITS.contains(&&expire[digits..])
}

fn accepts_lang(languages: &serde_json::Value, lang: &str) -> bool {
    languages
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|category| category["languages"].as_array())
        .flatten()
        .any(|language| {
            language["id"] == lang
                || language["alt_ids"]
                    .as_array()
                    .is_some_and(|alt| alt.iter().any(|id| id == lang))
        })
}

async fn new_paste(State(state): State<AppState>, Form(input): Form<NewPaste>) -> Response {
    let Some(text) = input.text else {
        return (StatusCode::BAD_REQUEST, "missing text").into_response();
    };
    let expire = input.expire.filter(|e| !e.is_empty());
    if let Some(expire) = &expire {
        if !is_valid_expire(expire) {
            return (StatusCode::BAD_REQUEST, "bad expire").into_response();
        }
    }
    let lang = input.lang.unwrap_or_else(|| "text".to_string());
    if !accepts_lang(&state.options.languages, &lang) {
        return (StatusCode::BAD_REQUEST, "unknown language").into_response();
    }

    let id = Uuid::new_v4().simple().to_string()[..10].to_string();
    let encrypted = input.password.is_some_and(|p| !p.is_empty());
    tracing::debug!(%id, %lang, encrypted, "paste stored");
    state.pastes.write().await.insert(id.clone(), text);
    Redirect::to(&format!("/paste/{id}")).into_response()
}

async fn raw_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, (StatusCode, &'static str)> {
    if !state.options.raw_enabled {
        return Err((StatusCode::FORBIDDEN, "raw view is disabled"));
    }
    let pastes = state.pastes.read().await;
    pastes
        .get(&id)
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "paste not found"))
}

async fn languages(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.options.languages.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expire_grammar() {
        for ok in ["10m", "15d", "1ns", "250ms", "3600s", "2h", "7us"] {
            assert!(is_valid_expire(ok), "{ok}");
        }
        for bad in ["", "m", "10", "10y", "-5m", "1.5h", "forever", "10 m"] {
            assert!(!is_valid_expire(bad), "{bad}");
        }
    }

    #[test]
    fn default_languages_accept_ids_and_alt_ids() {
        let languages = default_languages();
        assert!(accepts_lang(&languages, "python3"));
        assert!(accepts_lang(&languages, "py3"));
        assert!(accepts_lang(&languages, "irc"));
        assert!(!accepts_lang(&languages, "ruby"));
    }

    #[test]
    fn new_paste_fields_all_optional() {
        let input: NewPaste = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.text.is_none());
        assert!(input.lang.is_none());
    }
}
