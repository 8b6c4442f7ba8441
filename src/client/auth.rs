use std::{env, fmt};

const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Credentials attached to a request.
///
/// An entity keeps the `Auth` it was built with and hands it to every entity
/// and request derived from it.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    /// OAuth or personal access token, sent as `Authorization: token <value>`
    Token(String),
    /// Username and password, sent as HTTP Basic auth
    Basic { username: String, password: String },
}

impl Auth {
    pub fn token<S: Into<String>>(token: S) -> Self {
        Auth::Token(token.into())
    }

    pub fn basic<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Auth::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Token auth from `GITHUB_TOKEN`, or `Auth::None` when it's unset or empty
    pub fn from_env() -> Self {
        match env::var(GITHUB_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Auth::Token(token),
            _ => Auth::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Auth::None)
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Auth::None => request,
            Auth::Token(token) => {
                request.header(reqwest::header::AUTHORIZATION, format!("token {}", token))
            }
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }
}

impl Default for Auth {
    fn default() -> Self {
        Auth::None
    }
}

impl From<Option<String>> for Auth {
    fn from(token: Option<String>) -> Self {
        token.map(Auth::Token).unwrap_or(Auth::None)
    }
}

// Secrets never make it into logs or error messages
impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::None => Ok(()),
            Auth::Token(token) => {
                let prefix: String = token.chars().take(4).collect();
                write!(f, "token {}***", prefix)
            }
            Auth::Basic { username, .. } => write!(f, "{}:***", username),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::None => f.write_str("Auth::None"),
            _ => write!(f, "Auth({})", self),
        }
    }
}
