// Handshake: login and logout
//
// Login fetches fresh key material, submits the encrypted credentials to
// `/cgi/login`, then reads the session token out of the device's root page.
// Key material and the AES key never outlive a single `login` call.

use reqwest::header::REFERER;
use secrecy::SecretString;
use tracing::debug;

use crate::cgi::Act;
use crate::client::{Credentials, RouterClient};
use crate::crypto::{KeyMaterial, LoginPayload, extract_js_var, extract_ret_code};
use crate::error::Error;

/// `$.ret` for a wrong password.
const RET_BAD_PASSWORD: i64 = 71233;
/// `$.ret` when the device refuses the login request itself.
const RET_REJECTED: i64 = 71234;

/// Result of a best-effort logout.
///
/// The local session is always cleared; this only reports what the device
/// said about it.
#[derive(Debug)]
pub enum LogoutOutcome {
    /// There was no session to end.
    AlreadyLoggedOut,
    /// The device acknowledged the logout.
    Confirmed,
    /// The logout request failed; the local session was dropped anyway.
    Unconfirmed(Error),
}

impl LogoutOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl RouterClient {
    /// Authenticate against the device.
    ///
    /// Always starts from a clean slate: any existing session is dropped and
    /// fresh key material is fetched. On failure the client is left
    /// unauthenticated. On success the credentials are kept in memory for
    /// the one-shot re-login in [`RouterClient::call`].
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        self.invalidate();
        debug!(username, "logging in");

        let payload = {
            let key = self.fetch_key_material().await?;
            LoginPayload::build(&key, username, password)
        };

        let mut url = self.url("cgi/login")?;
        url.query_pairs_mut()
            .append_pair("data", &payload.data)
            .append_pair("sign", &payload.sign)
            .append_pair("Action", "1")
            .append_pair("LoginStatus", "0");

        let resp = self
            .http()
            .post(url)
            .header(REFERER, self.referer())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let body = self.read_body(resp).await?;

        match extract_ret_code(&body) {
            Some(0) => {}
            Some(code @ (RET_BAD_PASSWORD | RET_REJECTED)) => {
                debug!(code, "credentials rejected");
                return Err(Error::InvalidCredentials { code });
            }
            Some(code) => return Err(Error::Device { code }),
            None => return Err(Error::malformed("login reply has no `$.ret`", &body)),
        }

        let token = self.fetch_token().await?;
        self.session.establish(token);
        self.credentials = Some(Credentials::new(username, password));

        debug!("login successful");
        Ok(())
    }

    /// End the session. Never fails; see [`LogoutOutcome`].
    ///
    /// Does not re-login on expiry: an expired session is as good as ended.
    pub async fn logout(&mut self) -> LogoutOutcome {
        if !self.session.is_authenticated() {
            return LogoutOutcome::AlreadyLoggedOut;
        }

        debug!("logging out");
        let outcome = self.send_logout().await;
        self.invalidate();

        match outcome {
            Ok(()) => {
                debug!("logout complete");
                LogoutOutcome::Confirmed
            }
            Err(e) => {
                debug!(error = %e, "logout not confirmed by device");
                LogoutOutcome::Unconfirmed(e)
            }
        }
    }

    async fn send_logout(&mut self) -> Result<(), Error> {
        // Detach the cached credentials so `call` cannot log back in.
        self.credentials = None;
        self.call(&[Act::cgi("/cgi/logout")]).await.map(drop)
    }

    async fn fetch_key_material(&self) -> Result<KeyMaterial, Error> {
        let url = self.url("cgi/getParm")?;
        debug!(%url, "fetching key material");

        let resp = self
            .http()
            .post(url)
            .header(REFERER, self.referer())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let body = self.read_body(resp).await?;
        KeyMaterial::parse(&body)
    }

    async fn fetch_token(&self) -> Result<String, Error> {
        let url = self.base_url().clone();
        debug!(%url, "fetching session token");

        let resp = self
            .http()
            .get(url)
            .header(REFERER, self.referer())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let body = self.read_body(resp).await?;

        extract_js_var(&body, "token")
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| Error::malformed("root page has no session token", &body))
    }
}
