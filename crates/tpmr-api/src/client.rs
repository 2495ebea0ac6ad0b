// Router HTTP client
//
// Wraps `reqwest::Client` with the device's session state and the `/cgi`
// session-call. Handshake, accessors and commands are inherent methods in
// sibling modules (auth, system, lte, ...) so this file stays focused on
// transport mechanics and the re-login policy.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, REFERER};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace, warn};
use url::Url;

use crate::cgi::{Act, ParamObject, Reply, encode_acts, query_string};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Header carrying the session token on `/cgi` calls.
const TOKEN_HEADER: &str = "TokenID";

/// Accept `10.0.0.1`, `router.lan:8080` or a full `http(s)://` URL.
pub fn parse_base_url(address: &str) -> Result<Url, Error> {
    let address = address.trim().trim_end_matches('/');
    let mut url = if address.contains("://") {
        Url::parse(address)?
    } else {
        Url::parse(&format!("http://{address}"))?
    };
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// ── Session ──────────────────────────────────────────────────────────

/// Authentication state for one device.
///
/// Created empty with the client, filled by `login`, cleared by `logout` or
/// by an expiry that re-login could not recover from.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: Url,
    token: Option<String>,
    issued_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            issued_at: None,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// When the current token was obtained.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn establish(&mut self, token: String) {
        self.token = Some(token);
        self.issued_at = Some(Utc::now());
    }

    pub(crate) fn clear(&mut self) {
        self.token = None;
        self.issued_at = None;
    }
}

/// Credentials kept for the one-shot re-login.
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) password: SecretString,
}

impl Credentials {
    pub(crate) fn new(username: &str, password: &SecretString) -> Self {
        Self {
            username: username.to_owned(),
            password: SecretString::from(password.expose_secret().to_owned()),
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Client for one TP-Link MR router.
///
/// Every operation takes `&mut self`: the session token and the re-login
/// state are shared, so one call is in flight at a time. Wrap the client in
/// a `tokio::sync::Mutex` to share it between tasks.
pub struct RouterClient {
    http: reqwest::Client,
    pub(crate) session: Session,
    pub(crate) credentials: Option<Credentials>,
    timeout: Duration,
}

impl RouterClient {
    /// Create a client for the device at `address`.
    ///
    /// A cookie jar is added to the transport if it has none; the device
    /// pairs its token with a session cookie.
    pub fn new(address: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = parse_base_url(address)?;
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self::with_client(http, base_url, config.timeout))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            session: Session::new(base_url),
            credentials: None,
            timeout,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        self.session.base_url()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Forget the token and the cached credentials.
    pub(crate) fn invalidate(&mut self) {
        self.session.clear();
        self.credentials = None;
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url().join(path)?)
    }

    /// The device checks that requests come from its own UI.
    pub(crate) fn referer(&self) -> &str {
        self.base_url().as_str()
    }

    pub(crate) fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Map the HTTP status and read the body as text.
    ///
    /// Handshake replies carry key material and the session token, so only
    /// their size is traced here.
    pub(crate) async fn read_body(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(Error::SessionExpired),
            StatusCode::SERVICE_UNAVAILABLE => return Err(Error::DeviceBusy),
            s if !s.is_success() => {
                return Err(Error::Http {
                    status: s.as_u16(),
                });
            }
            _ => {}
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(%status, bytes = body.len(), "device reply");
        Ok(body)
    }

    // ── Session-call ─────────────────────────────────────────────────

    /// Run a batch of acts against `/cgi`.
    ///
    /// Requires a session ([`Error::NotLoggedIn`] otherwise). If the device
    /// reports the session expired, logs in once with the cached credentials
    /// and replays the same batch; a second expiry is returned as-is and
    /// the session is dropped. Reply values are left as strings.
    pub async fn call(&mut self, acts: &[Act]) -> Result<Reply, Error> {
        if !self.session.is_authenticated() {
            return Err(Error::NotLoggedIn);
        }

        match self.send_acts(acts).await {
            Err(Error::SessionExpired) => {}
            other => return other,
        }

        warn!("session expired, logging in again");
        let Some(credentials) = self.credentials.take() else {
            self.invalidate();
            return Err(Error::SessionExpired);
        };
        self.login(&credentials.username, &credentials.password).await?;

        let replayed = self.send_acts(acts).await;
        if matches!(replayed, Err(Error::SessionExpired)) {
            warn!("session expired again right after re-login");
            self.invalidate();
        }
        replayed
    }

    /// Read a single object. The device omitting it is a shape violation.
    pub(crate) async fn read_object(&mut self, act: Act) -> Result<ParamObject, Error> {
        let reply = self.call(std::slice::from_ref(&act)).await?;
        reply.into_objects(0).into_iter().next().ok_or_else(|| {
            Error::malformed(format!("reply has no `{}` object", act.object), "")
        })
    }

    /// Read every instance of a list object; none is an empty list.
    pub(crate) async fn read_list(&mut self, act: Act) -> Result<Vec<ParamObject>, Error> {
        let reply = self.call(std::slice::from_ref(&act)).await?;
        Ok(reply.into_objects(0))
    }

    async fn send_acts(&self, acts: &[Act]) -> Result<Reply, Error> {
        let token = self.session.token().ok_or(Error::NotLoggedIn)?;
        let body = encode_acts(acts)?;
        let mut url = self.url("cgi")?;
        url.set_query(Some(&query_string(acts)));

        debug!(%url, acts = acts.len(), "session call");

        let resp = self
            .http
            .post(url)
            .header(TOKEN_HEADER, token)
            .header(REFERER, self.referer())
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = self.read_body(resp).await?;
        trace!(body = %body, "session call reply");
        let reply = Reply::decode(&body)?;
        match reply.error_code() {
            0 => Ok(reply),
            code => Err(Error::Device { code }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_address_gets_http_scheme() {
        let url = parse_base_url("10.0.0.1").expect("valid");
        assert_eq!(url.as_str(), "http://10.0.0.1/");
    }

    #[test]
    fn full_url_is_kept() {
        let url = parse_base_url("https://router.lan:8443/").expect("valid");
        assert_eq!(url.as_str(), "https://router.lan:8443/");
        assert_eq!(
            url.join("cgi/login").map(String::from).ok().as_deref(),
            Some("https://router.lan:8443/cgi/login")
        );
    }

    #[test]
    fn sub_path_keeps_trailing_slash() {
        let url = parse_base_url("http://proxy.lan/router").expect("valid");
        assert_eq!(url.as_str(), "http://proxy.lan/router/");
    }

    #[test]
    fn garbage_address_is_rejected() {
        assert!(parse_base_url("").is_err());
        assert!(parse_base_url("http://exa mple").is_err());
    }

    #[test]
    fn session_starts_unauthenticated() {
        let mut session = Session::new(parse_base_url("10.0.0.1").expect("valid"));
        assert!(!session.is_authenticated());
        session.establish("abc".into());
        assert_eq!(session.token(), Some("abc"));
        assert!(session.issued_at().is_some());
        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.issued_at().is_none());
    }
}
