use crate::{Organization, Repository, User};
use log::{debug, trace, warn};
use reqwest::{header, redirect, Client as ReqwestClient, StatusCode};
use serde_json::Value;
use std::{fmt, time::Duration};

mod auth;
mod error;
pub mod json;

pub use auth::Auth;
pub use error::{Error, RequestError, Result};
pub use json::{ParseError, ParseErrorKind};

use error::{GithubClientError, UNKNOWN_ERROR};

// Constants
const DEFAULT_BASE_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: usize = 10;

const HEADER_METHOD_OVERRIDE: &str = "X-HTTP-Method-Override";

const MEDIA_TYPE_V3: &str = "application/vnd.github.v3+json";
const MEDIA_TYPE_JSON: &str = "application/json";

/// HTTP verbs understood by the Github v3 API
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }

    // Everything except GET carries a JSON body and the method override header
    fn has_body(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
        }
    }
}

/// Per-request overrides of the client's transport settings. Anything left as
/// `None` falls back to what the `Client` was built with.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub follow_redirects: Option<bool>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.follow_redirects = Some(follow_redirects);
        self
    }

    /// Add a header to the request. An `Authorization` header is only sent
    /// when the request carries no `Auth`; otherwise the `Auth` wins.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    follow_redirects: bool,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            timeout: None,
            follow_redirects: false,
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn follow_redirects(mut self, follow_redirects: bool) -> Self {
        self.follow_redirects = follow_redirects;
        self
    }

    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        url::Url::parse(&base_url)?;

        let user_agent = self.user_agent.unwrap_or_else(|| USER_AGENT.to_owned());

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(MEDIA_TYPE_V3));

        let client = ReqwestClient::builder()
            .user_agent(&user_agent)
            .default_headers(headers.clone())
            .redirect(redirect::Policy::none())
            .build()?;
        let redirecting = ReqwestClient::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Client {
            base_url,
            user_agent,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            follow_redirects: self.follow_redirects,
            client,
            redirecting,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Issues requests against the Github v3 API.
///
/// Cloning is cheap; every entity keeps a clone of the client it came from.
#[derive(Clone, Debug)]
pub struct Client {
    /// Base URL to use for API requests. Defaults to the public GitHub API,
    /// but can be overridden for use with GitHub Enterprise or a test server.
    /// Never terminated with a trailing slash; paths supply the leading one.
    base_url: String,

    /// User agent string sent when communicating with GitHub APIs
    user_agent: String,

    /// Timeout applied to requests that don't override it
    timeout: Duration,

    /// Whether requests that don't override it follow redirects
    follow_redirects: bool,

    /// Client used to make http requests, never follows redirects
    client: ReqwestClient,

    /// Same as `client` but follows redirects
    redirecting: ReqwestClient,
}

impl Client {
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Perform a single request and decode the JSON response.
    ///
    /// `path` is appended verbatim to the base url and must start with `/`.
    /// Any status of 400 or above becomes an `Error::Request`. A response
    /// without a body decodes to `Value::Null`.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        params: &Value,
        auth: &Auth,
        options: &RequestOptions,
    ) -> Result<Value> {
        let (status, body) = self.send(method, path, params, auth, options).await?;

        if status.as_u16() >= 400 {
            return Err(Self::request_error(status, &body, method, path, params, auth).into());
        }

        Ok(json::decode(&body)?)
    }

    pub async fn get(&self, path: &str, auth: &Auth) -> Result<Value> {
        self.execute(Method::Get, path, &Value::Null, auth, &RequestOptions::default())
            .await
    }

    pub async fn post(&self, path: &str, params: &Value, auth: &Auth) -> Result<Value> {
        self.execute(Method::Post, path, params, auth, &RequestOptions::default())
            .await
    }

    pub async fn put(&self, path: &str, params: &Value, auth: &Auth) -> Result<Value> {
        self.execute(Method::Put, path, params, auth, &RequestOptions::default())
            .await
    }

    pub async fn patch(&self, path: &str, params: &Value, auth: &Auth) -> Result<Value> {
        self.execute(Method::Patch, path, params, auth, &RequestOptions::default())
            .await
    }

    pub async fn delete(&self, path: &str, params: &Value, auth: &Auth) -> Result<Value> {
        self.execute(Method::Delete, path, params, auth, &RequestOptions::default())
            .await
    }

    pub async fn head(&self, path: &str, auth: &Auth) -> Result<Value> {
        self.execute(Method::Head, path, &Value::Null, auth, &RequestOptions::default())
            .await
    }

    /// GET an endpoint that answers "yes" with `204 No Content` and "no" with
    /// `404 Not Found`, like the membership and follower checks.
    ///
    /// A 404 is `Ok(false)`; every other error status is still an error.
    pub async fn boolean(&self, path: &str, auth: &Auth) -> Result<bool> {
        let (status, body) = self
            .send(Method::Get, path, &Value::Null, auth, &RequestOptions::default())
            .await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        if status.as_u16() >= 400 {
            return Err(
                Self::request_error(status, &body, Method::Get, path, &Value::Null, auth).into(),
            );
        }

        Ok(json::decode(&body)?.is_null())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        params: &Value,
        auth: &Auth,
        options: &RequestOptions,
    ) -> Result<(StatusCode, Vec<u8>)> {
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(path.to_owned()));
        }

        let url = format!("{}{}", self.base_url, path);
        let client = if options.follow_redirects.unwrap_or(self.follow_redirects) {
            &self.redirecting
        } else {
            &self.client
        };

        let mut request = client
            .request(method.into(), &url)
            .timeout(options.timeout.unwrap_or(self.timeout));

        if method.has_body() {
            let payload = json::encode(params)?;
            trace!("Github Request Body: {}", payload);
            request = request
                .header(header::CONTENT_TYPE, MEDIA_TYPE_JSON)
                .header(HEADER_METHOD_OVERRIDE, method.as_str())
                .body(payload);
        }

        for (name, value) in &options.headers {
            if auth.is_some() && name.eq_ignore_ascii_case(header::AUTHORIZATION.as_str()) {
                warn!("Ignoring Authorization header for {} {}: auth is set", method, path);
                continue;
            }
            request = request.header(name.as_str(), header::HeaderValue::from_str(value)?);
        }

        request = auth.apply(request);

        debug!("Github Request: {} {} (auth: {})", method, path, auth);
        let response = request.send().await?;
        let status = response.status();
        debug!("Github Response: {} ({} {})", status, method, path);

        let body = response.bytes().await?.to_vec();
        trace!("Github Response Body: {}", String::from_utf8_lossy(&body));

        Ok((status, body))
    }

    fn request_error(
        status: StatusCode,
        body: &[u8],
        method: Method,
        path: &str,
        params: &Value,
        auth: &Auth,
    ) -> RequestError {
        let message = GithubClientError::message_from_body(body);
        if message == UNKNOWN_ERROR {
            warn!(
                "Github returned {} without a readable error message ({} {})",
                status, method, path
            );
        }

        RequestError {
            status,
            message,
            method,
            path: path.to_owned(),
            auth: auth.to_string(),
            params: json::encode(params).unwrap_or_default(),
        }
    }

    /// Look up a user.
    ///
    /// Without auth this is `GET /users/:user`. With auth the authenticated
    /// user is returned instead (`GET /user`) and `username` is not used.
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/#get-a-single-user
    pub async fn user(&self, username: &str, auth: Auth) -> Result<User> {
        let result = if auth.is_none() {
            self.get(&format!("/users/{}", username), &auth).await?
        } else {
            self.get("/user", &auth).await?
        };

        Ok(User::from_value(self.clone(), result, auth))
    }

    /// Look up an organisation
    ///
    /// GitHub API docs: https://developer.github.com/v3/orgs/#get-an-organization
    pub async fn org(&self, login: &str, auth: Auth) -> Result<Organization> {
        let result = self.get(&format!("/orgs/{}", login), &auth).await?;

        Ok(Organization::from_value(self.clone(), result, auth))
    }

    /// Look up a repository by its `owner/name` key
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#get
    pub async fn repo(&self, key: &str, auth: Auth) -> Result<Repository> {
        let (owner, name) = match key.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => (*owner, *name),
            _ => return Err(Error::InvalidRepoKey(key.to_owned())),
        };

        let result = self.get(&format!("/repos/{}/{}", owner, name), &auth).await?;

        Ok(Repository::from_value(self.clone(), result, auth).with_owner(owner))
    }
}
