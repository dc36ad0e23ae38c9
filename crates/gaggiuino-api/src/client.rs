// Gaggiuino HTTP client
//
// Wraps `reqwest::Client` with base-URL handling and response
// classification. Endpoint methods live in sibling modules (status,
// profiles, settings, firmware) as inherent impls so this file stays
// about transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Host used when the user does not provide one (mDNS name of the controller).
pub const DEFAULT_BASE_URL: &str = "http://gaggiuino.local";

/// Parse a user-supplied host into a base URL.
///
/// Bare hosts (`gaggiuino.local`, `192.168.1.40:8080`) get an `http://`
/// scheme. The path always ends with `/` so relative joins stay under it.
pub fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    let mut url = Url::parse(&with_scheme)?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(url::ParseError::EmptyHost));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Raw HTTP client for one Gaggiuino controller.
#[derive(Debug, Clone)]
pub struct GaggiuinoClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GaggiuinoClient {
    /// Create a client for `base_url` using the given transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// The controller base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET and decode a JSON body. 404 maps to [`Error::NotFound`].
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: truncate(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Like [`get_json`](Self::get_json) but a 404 yields `Ok(None)`.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, Error> {
        match self.get_json(url).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// GET and report only whether the controller answered 2xx.
    pub(crate) async fn probe(&self, url: Url) -> Result<bool, Error> {
        debug!("GET {} (probe)", url);
        let resp = self.http.get(url).send().await?;
        Ok(resp.status().is_success())
    }

    /// POST without a body.
    pub(crate) async fn post_empty(&self, url: Url) -> Result<bool, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).send().await?;
        Self::write_outcome(resp).await
    }

    /// PUT a JSON body.
    pub(crate) async fn put_json(&self, url: Url, body: &impl Serialize) -> Result<bool, Error> {
        debug!("PUT {}", url);
        let resp = self.http.put(url).json(body).send().await?;
        Self::write_outcome(resp).await
    }

    /// 2xx accepted, 4xx rejected by the device, 5xx an error.
    async fn write_outcome(resp: reqwest::Response) -> Result<bool, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(true);
        }
        if status.is_client_error() {
            debug!(status = status.as_u16(), "device rejected write");
            return Ok(false);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Api {
            status: status.as_u16(),
            message: truncate(&body),
        })
    }
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme_and_trailing_slash() {
        let url = normalize_base_url("gaggiuino.local").unwrap();
        assert_eq!(url.as_str(), "http://gaggiuino.local/");

        let url = normalize_base_url(" 192.168.1.40:8080 ").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.40:8080/");
    }

    #[test]
    fn path_prefix_is_preserved() {
        let client =
            GaggiuinoClient::with_client("https://proxy.lan/espresso", reqwest::Client::new())
                .unwrap();
        assert_eq!(
            client.api_url("system/status").unwrap().as_str(),
            "https://proxy.lan/espresso/api/system/status"
        );
    }

    #[test]
    fn rejects_unparseable_hosts() {
        assert!(normalize_base_url("http://").is_err());
        assert!(normalize_base_url("http://exa mple").is_err());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        assert_eq!(truncate(&body).chars().count(), 201);
        assert_eq!(truncate("short"), "short");
    }
}
