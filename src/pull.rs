use crate::{client::Client, entity::Entity, RepoRef};
use serde_json::Value;

/// A pull request
///
/// GitHub API docs: https://developer.github.com/v3/pulls/
#[derive(Clone, Debug)]
pub struct PullRequest {
    client: Client,
    entity: Entity,
    repo: RepoRef,
}

impl_entity!(PullRequest);

impl PullRequest {
    pub fn new(client: Client, entity: Entity, repo: RepoRef) -> Self {
        Self {
            client,
            entity,
            repo,
        }
    }

    /// The repository the pull request was opened against
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    pub fn number(&self) -> Option<u64> {
        self.entity.get("number").and_then(Value::as_u64)
    }

    pub fn title(&self) -> Option<&str> {
        self.entity.str("title")
    }
}
