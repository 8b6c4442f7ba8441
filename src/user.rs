use crate::{
    client::{Auth, Client, Result},
    entity::{self, Entity},
    Repository,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A Github user, either looked up by name or the authenticated user.
///
/// Endpoints that act "as" the user (emails, keys, follows, updates) need the
/// user to have been fetched with credentials.
///
/// GitHub API docs: https://developer.github.com/v3/users/
#[derive(Clone, Debug)]
pub struct User {
    client: Client,
    entity: Entity,
}

impl_entity!(User);

impl User {
    pub fn new(client: Client, entity: Entity) -> Self {
        Self { client, entity }
    }

    pub(crate) fn from_value(client: Client, value: Value, auth: Auth) -> Self {
        Self::new(client, Entity::from_value(value, auth))
    }

    pub fn login(&self) -> Option<&str> {
        self.entity.str("login")
    }

    fn wrap_users(&self, list: Value) -> BTreeMap<String, User> {
        let auth = self.auth();
        entity::key_by(list, "login", |user| {
            User::from_value(self.client.clone(), user, auth.clone())
        })
    }

    fn owned_repo(&self, value: Value) -> Repository {
        let repo = Repository::from_value(self.client.clone(), value, self.auth().clone());
        match self.login() {
            Some(login) => repo.with_owner(login),
            None => repo,
        }
    }

    /// Update the authenticated user and refresh this entity from the response
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/#update-the-authenticated-user
    pub async fn update(&mut self, properties: Value) -> Result<()> {
        let auth = self.entity.require_auth("User::update")?;

        let result = self.client.post("/user", &properties, auth).await?;
        if let Value::Object(data) = result {
            self.entity.merge(data);
        }

        Ok(())
    }

    /// List email addresses for the authenticated user
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/emails/#list-email-addresses-for-a-user
    pub async fn emails(&self) -> Result<Value> {
        let auth = self.entity.require_auth("User::emails")?;
        self.client.get("/user/emails", auth).await
    }

    /// Add email addresses, returning the user's new set of emails
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/emails/#add-email-addresses
    pub async fn add_emails(&self, emails: &[&str]) -> Result<Value> {
        let auth = self.entity.require_auth("User::add_emails")?;
        self.client.post("/user/emails", &json!(emails), auth).await
    }

    /// Delete email addresses
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/emails/#delete-email-addresses
    pub async fn delete_emails(&self, emails: &[&str]) -> Result<Value> {
        let auth = self.entity.require_auth("User::delete_emails")?;
        self.client.delete("/user/emails", &json!(emails), auth).await
    }

    /// List followers, keyed by login
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/followers/#list-followers-of-a-user
    pub async fn followers(&self) -> Result<BTreeMap<String, User>> {
        let path = if self.auth().is_some() {
            "/user/followers".to_owned()
        } else {
            format!("/users/{}/followers", self.entity.segment("login")?)
        };

        let result = self.client.get(&path, self.auth()).await?;
        Ok(self.wrap_users(result))
    }

    /// List the users this user follows, keyed by login
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/followers/#list-users-followed-by-another-user
    pub async fn following(&self) -> Result<BTreeMap<String, User>> {
        let path = if self.auth().is_some() {
            "/user/following".to_owned()
        } else {
            format!("/users/{}/following", self.entity.segment("login")?)
        };

        let result = self.client.get(&path, self.auth()).await?;
        Ok(self.wrap_users(result))
    }

    /// Check if the authenticated user follows `user`
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/followers/#check-if-you-are-following-a-user
    pub async fn is_following(&self, user: &str) -> Result<bool> {
        let auth = self.entity.require_auth("User::is_following")?;
        self.client
            .boolean(&format!("/user/following/{}", user), auth)
            .await
    }

    /// Follow a user
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/followers/#follow-a-user
    pub async fn follow(&self, user: &str) -> Result<bool> {
        let auth = self.entity.require_auth("User::follow")?;
        let result = self
            .client
            .put(&format!("/user/following/{}", user), &json!({}), auth)
            .await?;

        // 204 No Content
        Ok(result.is_null())
    }

    /// Unfollow a user
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/followers/#unfollow-a-user
    pub async fn unfollow(&self, user: &str) -> Result<bool> {
        let auth = self.entity.require_auth("User::unfollow")?;
        let result = self
            .client
            .delete(&format!("/user/following/{}", user), &json!({}), auth)
            .await?;

        Ok(result.is_null())
    }

    /// List public keys for the authenticated user, keyed by key id
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/keys/#list-your-public-keys
    pub async fn keys(&self) -> Result<BTreeMap<String, Value>> {
        let auth = self.entity.require_auth("User::keys")?;
        let result = self.client.get("/user/keys", auth).await?;

        Ok(entity::key_by(result, "id", |key| key))
    }

    /// Get a single public key
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/keys/#get-a-single-public-key
    pub async fn key(&self, id: u64) -> Result<Value> {
        let auth = self.entity.require_auth("User::key")?;
        self.client.get(&format!("/user/keys/{}", id), auth).await
    }

    /// Create a public key. Github answers an invalid key with a 422.
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/keys/#create-a-public-key
    pub async fn create_key(&self, key: Value) -> Result<Value> {
        let auth = self.entity.require_auth("User::create_key")?;
        self.client.post("/user/keys", &key, auth).await
    }

    /// Update a public key
    pub async fn update_key(&self, id: u64, key: Value) -> Result<Value> {
        let auth = self.entity.require_auth("User::update_key")?;
        self.client
            .post(&format!("/user/keys/{}", id), &key, auth)
            .await
    }

    /// Delete a public key
    ///
    /// GitHub API docs: https://developer.github.com/v3/users/keys/#delete-a-public-key
    pub async fn delete_key(&self, id: u64) -> Result<bool> {
        let auth = self.entity.require_auth("User::delete_key")?;
        let result = self
            .client
            .delete(&format!("/user/keys/{}", id), &json!({}), auth)
            .await?;

        Ok(result.is_null())
    }

    /// List repositories, keyed by name. With auth these are the
    /// authenticated user's repositories, including private ones.
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#list-your-repositories
    pub async fn repos(&self) -> Result<BTreeMap<String, Repository>> {
        let result = if self.auth().is_some() {
            self.client.get("/user/repos", self.auth()).await?
        } else {
            let path = format!("/users/{}/repos", self.entity.segment("login")?);
            self.client.get(&path, self.auth()).await?
        };

        let auth = self.auth();
        Ok(entity::key_by(result, "name", |repo| {
            Repository::from_value(self.client.clone(), repo, auth.clone())
        }))
    }

    /// Get one of this user's repositories
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#get
    pub async fn repo(&self, name: &str) -> Result<Repository> {
        let path = format!("/repos/{}/{}", self.entity.segment("login")?, name);
        let result = self.client.get(&path, self.auth()).await?;

        Ok(self.owned_repo(result))
    }

    /// Create a repository for the authenticated user
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#create
    pub async fn create_repo(&self, repo: Value) -> Result<Repository> {
        let auth = self.entity.require_auth("User::create_repo")?;
        let result = self.client.post("/user/repos", &repo, auth).await?;

        Ok(self.owned_repo(result))
    }

    /// Fork `owner/name` into this user's account, or into `org` when given
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/forks/#create-a-fork
    pub async fn fork(&self, repo: &str, org: Option<&str>) -> Result<Repository> {
        let mut params = Map::new();
        if let Some(org) = org {
            params.insert("org".to_owned(), Value::from(org));
        }

        let path = format!("/repos/{}/forks", repo);
        let result = self
            .client
            .post(&path, &Value::Object(params), self.auth())
            .await?;

        match org {
            Some(org) => Ok(
                Repository::from_value(self.client.clone(), result, self.auth().clone())
                    .with_owner(org),
            ),
            None => Ok(self.owned_repo(result)),
        }
    }

    /// Fork an already fetched repository
    pub async fn fork_repo(&self, repo: &Repository, org: Option<&str>) -> Result<Repository> {
        self.fork(&repo.full_name()?, org).await
    }
}
