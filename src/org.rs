use crate::{
    client::{Auth, Client, Result},
    entity::{self, Entity},
    Repository, User,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// A Github organisation
///
/// GitHub API docs: https://developer.github.com/v3/orgs/
#[derive(Clone, Debug)]
pub struct Organization {
    client: Client,
    entity: Entity,
}

impl_entity!(Organization);

impl Organization {
    pub fn new(client: Client, entity: Entity) -> Self {
        Self { client, entity }
    }

    pub(crate) fn from_value(client: Client, value: Value, auth: Auth) -> Self {
        Self::new(client, Entity::from_value(value, auth))
    }

    pub fn login(&self) -> Option<&str> {
        self.entity.str("login")
    }

    /// List members, keyed by login
    ///
    /// GitHub API docs: https://developer.github.com/v3/orgs/members/#members-list
    pub async fn members(&self) -> Result<BTreeMap<String, User>> {
        let path = format!("/orgs/{}/members", self.entity.segment("login")?);
        let result = self.client.get(&path, self.auth()).await?;

        let auth = self.auth();
        Ok(entity::key_by(result, "login", |user| {
            User::from_value(self.client.clone(), user, auth.clone())
        }))
    }

    /// Check whether `username` is a member of this organisation
    ///
    /// GitHub API docs: https://developer.github.com/v3/orgs/members/#check-membership
    pub async fn is_member(&self, username: &str) -> Result<bool> {
        let path = format!(
            "/orgs/{}/members/{}",
            self.entity.segment("login")?,
            username
        );
        self.client.boolean(&path, self.auth()).await
    }

    /// List teams, keyed by team id. Only part of each team is returned here;
    /// use `team` for the full record.
    ///
    /// GitHub API docs: https://developer.github.com/v3/teams/#list-teams
    pub async fn teams(&self) -> Result<BTreeMap<String, Team>> {
        let auth = self.entity.require_auth("Organization::teams")?;
        let path = format!("/orgs/{}/teams", self.entity.segment("login")?);
        let result = self.client.get(&path, auth).await?;

        Ok(entity::key_by(result, "id", |team| {
            Team::from_value(self.client.clone(), team, auth.clone())
        }))
    }

    /// Get a team by id
    ///
    /// GitHub API docs: https://developer.github.com/v3/teams/#get-team
    pub async fn team(&self, id: u64) -> Result<Team> {
        let auth = self.entity.require_auth("Organization::team")?;
        let result = self.client.get(&format!("/teams/{}", id), auth).await?;

        Ok(Team::from_value(self.client.clone(), result, auth.clone()))
    }

    /// List repositories, keyed by name.
    ///
    /// The request is always made without credentials, so only public
    /// repositories are listed. Private ones are reachable through a team.
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#list-organization-repositories
    pub async fn repos(&self) -> Result<BTreeMap<String, Repository>> {
        let path = format!("/orgs/{}/repos", self.entity.segment("login")?);
        let result = self.client.get(&path, &Auth::None).await?;

        let auth = self.auth();
        Ok(entity::key_by(result, "name", |repo| {
            Repository::from_value(self.client.clone(), repo, auth.clone())
        }))
    }

    /// Get one of this organisation's repositories
    ///
    /// GitHub API docs: https://developer.github.com/v3/repos/#get
    pub async fn repo(&self, name: &str) -> Result<Repository> {
        let path = format!("/repos/{}/{}", self.entity.segment("login")?, name);
        let result = self.client.get(&path, self.auth()).await?;

        Ok(Repository::from_value(
            self.client.clone(),
            result,
            self.auth().clone(),
        ))
    }
}

/// A team within an organisation
///
/// GitHub API docs: https://developer.github.com/v3/teams/
#[derive(Clone, Debug)]
pub struct Team {
    client: Client,
    entity: Entity,
}

impl_entity!(Team);

impl Team {
    pub fn new(client: Client, entity: Entity) -> Self {
        Self { client, entity }
    }

    pub(crate) fn from_value(client: Client, value: Value, auth: Auth) -> Self {
        Self::new(client, Entity::from_value(value, auth))
    }

    pub fn id(&self) -> Option<u64> {
        self.entity.get("id").and_then(Value::as_u64)
    }

    /// List the team's repositories, keyed by name
    ///
    /// GitHub API docs: https://developer.github.com/v3/teams/#list-team-repos
    pub async fn repos(&self) -> Result<BTreeMap<String, Repository>> {
        let auth = self.entity.require_auth("Team::repos")?;
        let path = format!("/teams/{}/repos", self.entity.segment("id")?);
        let result = self.client.get(&path, auth).await?;

        Ok(entity::key_by(result, "name", |repo| {
            Repository::from_value(self.client.clone(), repo, auth.clone())
        }))
    }
}
