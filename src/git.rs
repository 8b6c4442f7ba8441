//! Git database objects: refs, commits, blobs and trees.
//!
//! GitHub API docs: https://developer.github.com/v3/git/

use crate::{
    client::{Auth, Client, Result},
    entity::{self, require_auth, Entity},
    RepoRef,
};
use log::trace;
use serde_json::Value;

/// A git reference such as `refs/heads/master`
///
/// GitHub API docs: https://developer.github.com/v3/git/refs/
#[derive(Clone, Debug)]
pub struct GitRef {
    client: Client,
    entity: Entity,
    repo: RepoRef,
}

impl_entity!(GitRef);

impl GitRef {
    pub fn new(client: Client, entity: Entity, repo: RepoRef) -> Self {
        Self {
            client,
            entity,
            repo,
        }
    }

    /// The repository this ref lives in
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Full name of the ref, e.g. `refs/heads/master`
    pub fn ref_name(&self) -> Option<&str> {
        self.entity.str("ref")
    }

    pub fn sha(&self) -> Option<&str> {
        self.entity.str("object.sha")
    }

    /// Point the ref somewhere else. The entity is rebuilt from scratch out of
    /// Github's response.
    ///
    /// GitHub API docs: https://developer.github.com/v3/git/refs/#update-a-reference
    pub async fn update(&mut self, data: Value) -> Result<()> {
        let auth = self.entity.require_auth("GitRef::update")?;
        let path = self
            .repo
            .path(&format!("/git/{}", self.entity.segment("ref")?));

        let result = self.client.post(&path, &data, auth).await?;
        match result {
            Value::Object(data) => self.entity.replace(data),
            _ => self.entity.replace(Default::default()),
        }

        Ok(())
    }
}

/// A commit in the git database
///
/// GitHub API docs: https://developer.github.com/v3/git/commits/
#[derive(Clone, Debug)]
pub struct GitCommit {
    client: Client,
    entity: Entity,
}

impl_entity!(GitCommit);

impl GitCommit {
    pub fn new(client: Client, entity: Entity) -> Self {
        Self { client, entity }
    }

    pub fn sha(&self) -> Option<&str> {
        self.entity.str("sha")
    }

    /// Create a commit in `repo`
    ///
    /// GitHub API docs: https://developer.github.com/v3/git/commits/#create-a-commit
    pub async fn create(client: &Client, repo: &RepoRef, data: Value, auth: Auth) -> Result<Self> {
        require_auth(&auth, "GitCommit::create")?;

        let result = client.post(&repo.path("/git/commits"), &data, &auth).await?;
        Ok(Self::new(client.clone(), Entity::from_value(result, auth)))
    }
}

/// A blob in the git database
///
/// GitHub API docs: https://developer.github.com/v3/git/blobs/
#[derive(Clone, Debug)]
pub struct GitBlob {
    client: Client,
    entity: Entity,
}

impl_entity!(GitBlob);

impl GitBlob {
    pub fn new(client: Client, entity: Entity) -> Self {
        Self { client, entity }
    }

    pub fn sha(&self) -> Option<&str> {
        self.entity.str("sha")
    }

    /// Create a blob in `repo`
    ///
    /// GitHub API docs: https://developer.github.com/v3/git/blobs/#create-a-blob
    pub async fn create(client: &Client, repo: &RepoRef, data: Value, auth: Auth) -> Result<Self> {
        require_auth(&auth, "GitBlob::create")?;

        let result = client.post(&repo.path("/git/blobs"), &data, &auth).await?;
        Ok(Self::new(client.clone(), Entity::from_value(result, auth)))
    }
}

/// The ways an entry of a new tree can name its content
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeObject {
    /// A blob object embedded under `blob`
    Blob,
    /// An existing tree or blob referenced by `sha`
    Sha,
    /// Raw file `content` for Github to turn into a blob
    Content,
}

impl TreeObject {
    pub fn classify(entry: &Value) -> Self {
        if entry.get("blob").map_or(false, Value::is_object) {
            TreeObject::Blob
        } else if entry.get("sha").map_or(false, entity::is_truthy) {
            TreeObject::Sha
        } else {
            TreeObject::Content
        }
    }
}

/// A tree in the git database
///
/// GitHub API docs: https://developer.github.com/v3/git/trees/
#[derive(Clone, Debug)]
pub struct GitTree {
    client: Client,
    entity: Entity,
}

impl_entity!(GitTree);

impl GitTree {
    pub fn new(client: Client, entity: Entity) -> Self {
        Self { client, entity }
    }

    pub fn sha(&self) -> Option<&str> {
        self.entity.str("sha")
    }

    /// Create a tree in `repo`.
    ///
    /// Entries are sent exactly as given, whichever `TreeObject` shape they
    /// take.
    ///
    /// GitHub API docs: https://developer.github.com/v3/git/trees/#create-a-tree
    pub async fn create(client: &Client, repo: &RepoRef, data: Value, auth: Auth) -> Result<Self> {
        require_auth(&auth, "GitTree::create")?;

        if let Some(entries) = data.get("tree").and_then(Value::as_array) {
            for entry in entries {
                trace!(
                    "tree entry {:?} is {:?}",
                    entry.get("path"),
                    TreeObject::classify(entry)
                );
            }
        }

        let result = client.post(&repo.path("/git/trees"), &data, &auth).await?;
        Ok(Self::new(client.clone(), Entity::from_value(result, auth)))
    }
}
