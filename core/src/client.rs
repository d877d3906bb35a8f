//! Paste submission, retrieval and language catalog handling.
//!
//! # Design
//! Each network operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, so
//! callers with their own HTTP stack can drive the protocol themselves. The
//! blocking operations (`submit_paste`, `load_languages`, `retrieve_paste`)
//! run those pairs through the injected `Transport`.
//!
//! The language catalog is cached as an `Arc` behind a `RwLock`. A reload
//! parses the whole document before swapping the pointer, so readers see
//! either the old catalog or the new one, never a mix. `submit_paste` loads
//! the catalog on first use; `supported_language_ids` does not.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use regex::Regex;
use url::{form_urlencoded, Url};

use crate::catalog::LanguageCatalog;
use crate::config::{ClientConfig, PasteDefaults, PasteOptions};
use crate::error::{GhostbinError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The fields of one paste submission after defaults have been applied.
///
/// `None` fields are left out of the request body entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteForm {
    pub text: String,
    pub password: Option<String>,
    pub expire: Option<String>,
    pub lang: String,
}

impl PasteForm {
    /// URL-form-encode the fields in wire order.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("text", &self.text);
        if let Some(password) = &self.password {
            serializer.append_pair("password", password);
        }
        if let Some(expire) = &self.expire {
            serializer.append_pair("expire", expire);
        }
        serializer.append_pair("lang", &self.lang);
        serializer.finish()
    }
}

/// Blocking client for one GhostBin instance.
#[derive(Debug)]
pub struct GhostbinClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
    catalog: RwLock<Option<Arc<LanguageCatalog>>>,
    paste_url: Regex,
}

impl GhostbinClient<UreqTransport> {
    /// Client using a redirect-suppressing ureq agent. Does no I/O.
    pub fn new(config: ClientConfig) -> Self {
        let mut transport = UreqTransport::new(config.timeout);
        if let Some(limit) = config.max_body_size {
            transport = transport.with_body_limit(limit);
        }
        Self::with_transport(config, transport)
    }
}

impl Default for GhostbinClient<UreqTransport> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<T: Transport> GhostbinClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let paste_url = paste_url_pattern(&config.host);
        Self {
            config,
            transport,
            catalog: RwLock::new(None),
            paste_url,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn defaults(&self) -> &PasteDefaults {
        &self.config.defaults
    }

    /// Merge `update` into the submission defaults.
    pub fn update_defaults(&mut self, update: PasteOptions) {
        self.config.defaults.update(update);
    }

    /// Apply this client's defaults to a submission.
    ///
    /// An explicit password wins even when empty; an explicit `expire` or
    /// `lang` wins only when non-empty. Empty passwords and expirations are
    /// dropped.
    pub fn resolve(&self, text: &str, options: PasteOptions) -> PasteForm {
        let defaults = &self.config.defaults;
        let password = options.password.or_else(|| defaults.password.clone());
        let expire = options
            .expire
            .filter(|e| !e.is_empty())
            .or_else(|| defaults.expire.clone());
        let lang = options
            .lang
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| defaults.lang.clone());

        PasteForm {
            text: text.to_string(),
            password: password.filter(|p| !p.is_empty()),
            expire: expire.filter(|e| !e.is_empty()),
            lang,
        }
    }

    // -----------------------------------------------------------------------
    // Request building / response parsing
    // -----------------------------------------------------------------------

    pub fn build_submit_paste(&self, form: &PasteForm) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/paste/new", self.config.base_url()),
            headers: vec![
                ("User-Agent".to_string(), self.config.user_agent.clone()),
                ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
            ],
            body: Some(form.encode()),
        }
    }

    /// Turn the submission response into the paste URL.
    pub fn parse_submit_paste(&self, form: &PasteForm, response: HttpResponse) -> Result<String> {
        match response.status {
            303 => {
                let location = response.header("Location").ok_or_else(|| {
                    GhostbinError::Protocol("303 response without a Location header".to_string())
                })?;
                if Url::parse(location).is_ok() {
                    Ok(location.to_string())
                } else if location.starts_with('/') {
                    Ok(format!("{}{location}", self.config.base_url()))
                } else {
                    Ok(format!("{}/{location}", self.config.base_url()))
                }
            }
            400 => Err(GhostbinError::Validation {
                body: response.body,
                fields: form.clone(),
            }),
            status => Err(GhostbinError::UnexpectedResponse {
                status,
                body: response.body,
                fields: form.clone(),
            }),
        }
    }

    pub fn build_load_languages(&self) -> HttpRequest {
        self.get(format!("{}/languages.json", self.config.base_url()))
    }

    pub fn parse_load_languages(&self, response: HttpResponse) -> Result<LanguageCatalog> {
        check_success(&response)?;
        LanguageCatalog::from_json(&response.body)
    }

    /// The id is not checked; it is placed into the path as given.
    pub fn build_retrieve_paste(&self, paste_id: &str) -> HttpRequest {
        self.get(format!("{}/paste/{paste_id}/raw", self.config.base_url()))
    }

    pub fn parse_retrieve_paste(&self, response: HttpResponse) -> Result<String> {
        check_success(&response)?;
        Ok(response.body)
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("User-Agent".to_string(), self.config.user_agent.clone())],
            body: None,
        }
    }

    // -----------------------------------------------------------------------
    // Blocking operations
    // -----------------------------------------------------------------------

    /// Submit a paste and return its URL.
    ///
    /// Fetches the language catalog first if it has not been loaded, so the
    /// first call may make two requests. An unknown `lang` fails with
    /// `InvalidArgument` before the paste itself is sent.
    pub fn submit_paste(&self, text: &str, options: PasteOptions) -> Result<String> {
        let form = self.resolve(text, options);

        let catalog = match self.language_catalog() {
            Some(catalog) => catalog,
            None => self.fetch_languages()?,
        };
        if !catalog.contains(&form.lang) {
            return Err(GhostbinError::InvalidArgument {
                argument: "lang",
                value: form.lang,
            });
        }

        let request = self.build_submit_paste(&form);
        let response = self.transport.send(&request)?;
        let url = self.parse_submit_paste(&form, response)?;
        tracing::debug!(%url, lang = %form.lang, "paste submitted");
        Ok(url)
    }

    /// Fetch `/languages.json` and replace the cached catalog.
    ///
    /// On any failure the previously cached catalog is kept.
    pub fn load_languages(&self) -> Result<()> {
        self.fetch_languages().map(|_| ())
    }

    fn fetch_languages(&self) -> Result<Arc<LanguageCatalog>> {
        let request = self.build_load_languages();
        let response = self.transport.send(&request)?;
        let catalog = Arc::new(self.parse_load_languages(response)?);

        let mut slot = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&catalog));
        tracing::debug!(
            categories = catalog.categories().len(),
            "language catalog loaded"
        );
        Ok(catalog)
    }

    /// The cached catalog, or `None` if `load_languages` never succeeded.
    pub fn language_catalog(&self) -> Option<Arc<LanguageCatalog>> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every `lang` value the cached catalog accepts.
    ///
    /// Does not fetch; fails with `State` if no catalog is loaded.
    pub fn supported_language_ids(&self) -> Result<BTreeSet<String>> {
        self.language_catalog()
            .map(|catalog| catalog.id_set())
            .ok_or_else(|| {
                GhostbinError::State(
                    "language catalog not loaded; call load_languages first".to_string(),
                )
            })
    }

    /// Fetch the raw text of a paste.
    ///
    /// Some instances, including ghostbin.com, disable the raw endpoint; the
    /// server's error status is returned as `Http`.
    pub fn retrieve_paste(&self, paste_id: &str) -> Result<String> {
        let request = self.build_retrieve_paste(paste_id);
        let response = self.transport.send(&request)?;
        self.parse_retrieve_paste(response)
    }

    /// Pull the paste id out of a paste URL on this client's host.
    ///
    /// Accepts any scheme and an optional `www.` prefix; anything else,
    /// including a different host, is `InvalidArgument`.
    pub fn extract_paste_id(&self, url: &str) -> Result<String> {
        self.paste_url
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|id| id.as_str().to_string())
            .ok_or_else(|| GhostbinError::InvalidArgument {
                argument: "url",
                value: url.to_string(),
            })
    }
}

/// `<scheme>://[www.]<host>/paste/<id>` for one configured host.
fn paste_url_pattern(host: &str) -> Regex {
    let pattern = format!(
        r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:www\.)?{}/paste/([A-Za-z0-9]+)$",
        regex::escape(host)
    );
    Regex::new(&pattern).expect("escaped host always forms a valid pattern")
}

/// Map non-2xx status codes to `GhostbinError::Http`.
fn check_success(response: &HttpResponse) -> Result<()> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(GhostbinError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
