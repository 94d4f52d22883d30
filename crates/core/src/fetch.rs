//! Retrieval of issue resources.
//!
//! The pipeline only talks to a [`Fetcher`]; resource paths are relative to
//! the API root of one edition. [`EpaperClient`] and [`Session`] implement it
//! on top of reqwest.

use serde::de::DeserializeOwned;

use crate::Result;

/// Source of JSON records and binary assets for one edition.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Fetches and decodes a JSON resource. Any failure is fatal.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T>;

    /// Fetches a binary asset. An empty result means the asset is unavailable.
    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        (**self).get_json(path).await
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        (**self).get_bytes(path).await
    }
}

/// Resource paths below an edition's API root.
pub mod paths {
    /// Issue record; `date` is `latest` or `YYYYMMDD`.
    pub fn issue(date: &str) -> String {
        date.to_string()
    }

    pub fn page(date: &str, page_index: usize) -> String {
        format!("{}/{}", date, page_index)
    }

    pub fn article(date: &str, page_index: usize, element_id: &str) -> String {
        format!("{}/{}/{}", date, page_index, element_id)
    }

    pub fn picture(date: &str, page_index: usize, picture_id: &str) -> String {
        format!("{}/{}/{}/jpg", date, page_index, picture_id)
    }

    /// Full-size rendering of the front page.
    pub fn cover(date: &str) -> String {
        format!("{}/0/big", date)
    }
}

#[cfg(feature = "fetch")]
pub use client::{EpaperClient, Session};

#[cfg(feature = "fetch")]
mod client {
    use std::time::Duration;

    use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
    use reqwest::{Client, RequestBuilder, Response};
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Serialize};

    use super::Fetcher;
    use crate::catalog::{Edition, SiteInfo};
    use crate::config::EpaperConfig;
    use crate::{EpaperError, Result};

    #[derive(Serialize)]
    struct LoginRequest<'a> {
        login: &'a str,
        password: &'a str,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct LoginResponse {
        #[serde(rename = "authorizationHeader")]
        authorization: Option<String>,
        error: Option<String>,
    }

    /// Unauthenticated client for the e-paper site.
    #[derive(Debug, Clone)]
    pub struct EpaperClient {
        http: Client,
        config: EpaperConfig,
    }

    impl EpaperClient {
        /// Builds the HTTP client with the configured timeout and standard headers.
        pub fn new(config: EpaperConfig) -> Result<Self> {
            config.base()?;

            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json;charset=utf-8"));
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

            let http = Client::builder()
                .timeout(Duration::from_secs(config.timeout))
                .user_agent(config.user_agent.as_str())
                .default_headers(headers)
                .build()
                .map_err(EpaperError::HttpError)?;

            Ok(Self { http, config })
        }

        pub fn config(&self) -> &EpaperConfig {
            &self.config
        }

        /// Downloads the application script and extracts imprint and editions.
        pub async fn site_info(&self) -> Result<SiteInfo> {
            let url = self.config.endpoint(&self.config.app_script);
            tracing::debug!(url = %url, "loading application script");
            let response = send(self.http.get(&url), self.config.timeout).await?;
            let script = success(response, &url)?.text().await?;
            Ok(SiteInfo::from_script(&script))
        }

        /// Logs in and binds the session to `edition`.
        ///
        /// Without credentials the session stays anonymous and can only
        /// retrieve free content.
        pub async fn login(self, edition: &Edition) -> Result<Session> {
            let authorization = match &self.config.credentials {
                Some(credentials) => {
                    let url = self.config.endpoint("api/user/login");
                    let body = LoginRequest { login: &credentials.user, password: &credentials.password };
                    let response = send(self.http.post(&url).json(&body), self.config.timeout).await?;
                    let response: LoginResponse = decode(success(response, &url)?, &url).await?;

                    if let Some(error) = response.error.filter(|e| !e.is_empty()) {
                        return Err(EpaperError::LoginFailed(error));
                    }
                    let header = response.authorization.filter(|a| !a.is_empty()).ok_or_else(|| {
                        EpaperError::LoginFailed("no authorization header in login response".to_string())
                    })?;
                    tracing::info!(user = %credentials.user, edition = %edition.code, "logged in");
                    Some(header)
                }
                None => {
                    tracing::warn!(edition = %edition.code, "no credentials configured, continuing anonymously");
                    None
                }
            };

            let api_root = self.config.endpoint(&format!("api/{}", edition.code));
            Ok(Session { http: self.http, timeout: self.config.timeout, api_root, authorization })
        }
    }

    /// Client bound to one edition, possibly authenticated.
    #[derive(Debug, Clone)]
    pub struct Session {
        http: Client,
        timeout: u64,
        api_root: String,
        authorization: Option<String>,
    }

    impl Session {
        pub fn api_root(&self) -> &str {
            &self.api_root
        }

        fn url(&self, path: &str) -> String {
            format!("{}/{}", self.api_root, path.trim_start_matches('/'))
        }

        fn get(&self, url: &str) -> RequestBuilder {
            let request = self.http.get(url);
            match &self.authorization {
                Some(value) => request.header(AUTHORIZATION, value),
                None => request,
            }
        }
    }

    impl Fetcher for Session {
        async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
            let url = self.url(path);
            let response = send(self.get(&url), self.timeout).await?;
            decode(success(response, &url)?, &url).await
        }

        async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
            let url = self.url(path);
            let response = send(self.get(&url), self.timeout).await?;
            if !response.status().is_success() {
                tracing::warn!(url = %url, status = response.status().as_u16(), "asset unavailable");
                return Ok(Vec::new());
            }
            Ok(response.bytes().await?.to_vec())
        }
    }

    async fn send(request: RequestBuilder, timeout: u64) -> Result<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() { EpaperError::Timeout { timeout } } else { EpaperError::HttpError(e) }
        })
    }

    fn success(response: Response, url: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(EpaperError::HttpStatus { status: status.as_u16(), url: url.to_string() })
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| EpaperError::Decode { resource: url.to_string(), source })
    }

}
