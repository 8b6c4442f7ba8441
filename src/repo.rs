use crate::{
    client::{Auth, Client, Error, Result},
    entity::{self, require_auth, Entity},
    GitBlob, GitCommit, GitRef, GitTree, PullRequest, Team, User,
};
use log::debug;
use serde_json::{json, Value};
use std::{collections::BTreeMap, fmt};

const DEFAULT_BRANCH: &str = "master";

/// The `owner/name` pair that identifies a repository
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new<O: Into<String>, N: Into<String>>(owner: O, name: N) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `/repos/:owner/:name` followed by `suffix`
    pub fn path(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{}", self.owner, self.name, suffix)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A branch name or git ref used as the head or base of a pull request.
///
/// One built from a `GitRef` without a `ref` (or a `GitCommit` without a
/// `sha`) holds the name of the missing field instead, and `create_pull`
/// refuses it before sending anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefSpec(std::result::Result<String, &'static str>);

impl RefSpec {
    /// The name, or `None` when it came from an entity without one
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref().ok()
    }

    fn resolve(&self) -> Result<&str> {
        self.0
            .as_deref()
            .map_err(|field| Error::MissingField(*field))
    }

    fn from_field(value: Option<&str>, field: &'static str) -> Self {
        match value {
            Some(name) if !name.is_empty() => RefSpec(Ok(name.to_owned())),
            _ => RefSpec(Err(field)),
        }
    }
}

impl Default for RefSpec {
    fn default() -> Self {
        RefSpec(Ok(DEFAULT_BRANCH.to_owned()))
    }
}

impl From<&str> for RefSpec {
    fn from(name: &str) -> Self {
        RefSpec(Ok(name.to_owned()))
    }
}

impl From<String> for RefSpec {
    fn from(name: String) -> Self {
        RefSpec(Ok(name))
    }
}

/// e.g. `refs/heads/master`
impl From<&GitRef> for RefSpec {
    fn from(git_ref: &GitRef) -> Self {
        RefSpec::from_field(git_ref.ref_name(), "ref")
    }
}

impl From<&GitCommit> for RefSpec {
    fn from(commit: &GitCommit) -> Self {
        RefSpec::from_field(commit.sha(), "sha")
    }
}

/// A Github repository
///
/// GitHub API docs: https://developer.github.com/v3/repos/
#[derive(Clone, Debug)]
pub struct Repository {
    client: Client,
    entity: Entity,

    /// Login of the account this repository was fetched through. Takes
    /// precedence over `owner.login` in the data.
    owner: Option<String>,
}

impl_entity!(Repository);

impl Repository {
    pub fn new(client: Client, entity: Entity) -> Self {
        Self {
            client,
            entity,
            owner: None,
        }
    }

    pub(crate) fn from_value(client: Client, value: Value, auth: Auth) -> Self {
        Self::new(client, Entity::from_value(value, auth))
    }

    /// Record the login of the account that owns this repository
    pub fn with_owner<S: Into<String>>(mut self, owner: S) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Login of the owning account
    pub fn login(&self) -> Option<&str> {
        self.owner
            .as_deref()
            .or_else(|| self.entity.str("owner.login"))
    }

    pub fn name(&self) -> Option<&str> {
        self.entity.str("name")
    }

    pub fn repo_ref(&self) -> Result<RepoRef> {
        let owner = self.login().ok_or(Error::MissingField("owner.login"))?;
        let name = self.entity.segment("name")?;
        Ok(RepoRef::new(owner, name))
    }

    /// `owner/name`
    pub fn full_name(&self) -> Result<String> {
        Ok(self.repo_ref()?.to_string())
    }

    /// The repository this one was forked from, if Github told us
    pub fn parent(&self) -> Option<RepoRef> {
        let owner = self.entity.str("parent.owner.login")?;
        let name = self.entity.str("parent.name")?;
        Some(RepoRef::new(owner, name))
    }

    fn path(&self, suffix: &str) -> Result<String> {
        Ok(self.repo_ref()?.path(suffix))
    }

    /// Edit this repository and refresh the entity from the response
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#edit
    pub async fn update(&mut self, data: Value) -> Result<()> {
        let path = self.path("")?;
        let auth = self.entity.require_auth("Repository::update")?;

        let result = self.client.post(&path, &data, auth).await?;
        if let Value::Object(data) = result {
            self.entity.merge(data);
        }

        Ok(())
    }

    /// List contributors, keyed by login. The request itself is sent without
    /// credentials.
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#list-contributors
    pub async fn contributors(&self) -> Result<BTreeMap<String, User>> {
        let result = self
            .client
            .get(&self.path("/contributors")?, &Auth::None)
            .await?;

        let auth = self.auth();
        Ok(entity::key_by(result, "login", |user| {
            User::from_value(self.client.clone(), user, auth.clone())
        }))
    }

    /// Bytes of code per language
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#list-languages
    pub async fn languages(&self) -> Result<Value> {
        self.client
            .get(&self.path("/languages")?, self.auth())
            .await
    }

    /// List teams with access to this repository, keyed by team id
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#list-teams
    pub async fn teams(&self) -> Result<BTreeMap<String, Team>> {
        let auth = self.entity.require_auth("Repository::teams")?;
        let result = self.client.get(&self.path("/teams")?, auth).await?;

        Ok(entity::key_by(result, "id", |team| {
            Team::from_value(self.client.clone(), team, auth.clone())
        }))
    }

    fn bound_ref(&self, repo: &RepoRef, value: Value) -> GitRef {
        GitRef::new(
            self.client.clone(),
            Entity::from_value(value, self.auth().clone()),
            repo.clone(),
        )
    }

    /// List every ref, keyed by its full name (`refs/heads/master`)
    ///
    /// GitHub API docs: https://developer.github.com/v3/git/refs/#get-all-references
    pub async fn git_refs(&self) -> Result<BTreeMap<String, GitRef>> {
        let repo = self.repo_ref()?;
        let result = self.client.get(&repo.path("/git/refs"), self.auth()).await?;

        Ok(entity::key_by(result, "ref", |git_ref| {
            self.bound_ref(&repo, git_ref)
        }))
    }

    /// Get a ref by its full name, e.g. `refs/heads/master`
    ///
    /// GitHub API docs: https://developer.github.com/v3/git/refs/#get-a-reference
    pub async fn git_ref(&self, key: &str) -> Result<GitRef> {
        let repo = self.repo_ref()?;
        let path = repo.path(&format!("/git/{}", key));
        let result = self.client.get(&path, self.auth()).await?;

        Ok(self.bound_ref(&repo, result))
    }

    /// Create a ref
    ///
    /// GitHub API docs: https://developer.github.com/v3/git/refs/#create-a-reference
    pub async fn create_git_ref(&self, data: Value) -> Result<GitRef> {
        let auth = self.entity.require_auth("Repository::create_git_ref")?;
        let repo = self.repo_ref()?;
        let result = self.client.post(&repo.path("/git/refs"), &data, auth).await?;

        Ok(self.bound_ref(&repo, result))
    }

    /// Get a commit from the git database by sha
    ///
    /// GitHub API docs: https://developer.github.com/v3/git/commits/#get-a-commit
    pub async fn git_commit(&self, sha: &str) -> Result<GitCommit> {
        let path = self.path(&format!("/git/commits/{}", sha))?;
        let result = self.client.get(&path, self.auth()).await?;

        Ok(GitCommit::new(
            self.client.clone(),
            Entity::from_value(result, self.auth().clone()),
        ))
    }

    /// GitHub API docs: https://developer.github.com/v3/git/commits/#create-a-commit
    pub async fn create_git_commit(&self, data: Value) -> Result<GitCommit> {
        require_auth(self.auth(), "Repository::create_git_commit")?;
        GitCommit::create(&self.client, &self.repo_ref()?, data, self.auth().clone()).await
    }

    /// GitHub API docs: https://developer.github.com/v3/git/blobs/#create-a-blob
    pub async fn create_git_blob(&self, data: Value) -> Result<GitBlob> {
        require_auth(self.auth(), "Repository::create_git_blob")?;
        GitBlob::create(&self.client, &self.repo_ref()?, data, self.auth().clone()).await
    }

    /// GitHub API docs: https://developer.github.com/v3/git/trees/#create-a-tree
    pub async fn create_git_tree(&self, data: Value) -> Result<GitTree> {
        require_auth(self.auth(), "Repository::create_git_tree")?;
        GitTree::create(&self.client, &self.repo_ref()?, data, self.auth().clone()).await
    }

    /// List pull requests
    ///
    /// GitHub API docs: https://developer.github.com/v3/pulls/#list-pull-requests
    pub async fn pulls(&self) -> Result<Vec<PullRequest>> {
        let repo = self.repo_ref()?;
        let result = self.client.get(&repo.path("/pulls"), self.auth()).await?;

        Ok(entity::items(result)
            .into_iter()
            .map(|pull| {
                PullRequest::new(
                    self.client.clone(),
                    Entity::from_value(pull, self.auth().clone()),
                    repo.clone(),
                )
            })
            .collect())
    }

    /// Open a pull request from `head` into `base`.
    ///
    /// Github wants pull requests from a fork posted to the upstream
    /// repository, so when this repository has a `parent` that is where the
    /// request goes. `head` is namespaced with this repository's owner
    /// (`owner:branch`) unless it already starts with the owner's login.
    ///
    /// GitHub API docs: https://developer.github.com/v3/pulls/#create-a-pull-request
    pub async fn create_pull<H, B>(
        &self,
        title: &str,
        body: &str,
        head: H,
        base: B,
    ) -> Result<PullRequest>
    where
        H: Into<RefSpec>,
        B: Into<RefSpec>,
    {
        let auth = self.entity.require_auth("Repository::create_pull")?;
        let repo = self.repo_ref()?;

        let head = head.into();
        let head = head.resolve()?;
        let head = if head.starts_with(repo.owner.as_str()) {
            head.to_owned()
        } else {
            format!("{}:{}", repo.owner, head)
        };
        let base = base.into();
        let base = base.resolve()?;

        let target = self.parent().unwrap_or(repo);
        debug!("Opening pull request {} -> {}:{}", head, target, base);

        let request = json!({
            "title": title,
            "body": body,
            "head": head,
            "base": base,
        });
        let result = self.client.post(&target.path("/pulls"), &request, auth).await?;

        Ok(PullRequest::new(
            self.client.clone(),
            Entity::from_value(result, auth.clone()),
            target,
        ))
    }
}
