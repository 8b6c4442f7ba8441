mod common;

use common::{header, requests, setup};
use hubkit::{Auth, Client, Entity, Error, RepoRef, Repository, MISSING_KEY};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_json, method, path},
    Mock, ResponseTemplate,
};

fn repository(client: &Client, data: Value, auth: Auth) -> Repository {
    Repository::new(client.clone(), Entity::from_value(data, auth))
}

fn fork(client: &Client) -> Repository {
    repository(
        client,
        json!({
            "name": "demo",
            "owner": {"login": "alice"},
            "parent": {"owner": {"login": "bob"}, "name": "demo"}
        }),
        Auth::token("abc"),
    )
}

#[tokio::test]
async fn pull_request_from_fork_goes_upstream() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/repos/bob/demo/pulls"))
        .and(body_json(json!({
            "title": "Add feature",
            "body": "Please pull",
            "head": "alice:feature",
            "base": "master"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 42, "title": "Add feature"})))
        .expect(1)
        .mount(&server)
        .await;

    let pull = fork(&client)
        .create_pull("Add feature", "Please pull", "feature", "master")
        .await
        .unwrap();

    assert_eq!(pull.number(), Some(42));
    assert_eq!(pull.title(), Some("Add feature"));
    assert_eq!(pull.repo(), &RepoRef::new("bob", "demo"));

    let requests = requests(&server).await;
    assert_eq!(header(&requests[0], "authorization"), Some("token abc"));
}

#[tokio::test]
async fn pull_request_without_parent_targets_self() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/repos/alice/demo/pulls"))
        .and(body_json(json!({
            "title": "t",
            "body": "b",
            "head": "alice:topic",
            "base": "develop"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repository(
        &client,
        json!({"name": "demo", "owner": {"login": "alice"}}),
        Auth::token("abc"),
    );
    let pull = repo
        .create_pull("t", "b", "alice:topic", "develop")
        .await
        .unwrap();
    assert_eq!(pull.repo(), &RepoRef::new("alice", "demo"));
}

#[tokio::test]
async fn pull_request_head_from_ref_and_default_base() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/demo/git/refs/heads/feature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/feature",
            "object": {"sha": "aa218f56b14c9653891f9e74264a383fa43fefbd", "type": "commit"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/bob/demo/pulls"))
        .and(body_json(json!({
            "title": "t",
            "body": "",
            "head": "alice:refs/heads/feature",
            "base": "master"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"number": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let repo = fork(&client);
    let git_ref = repo.git_ref("refs/heads/feature").await.unwrap();
    assert_eq!(git_ref.sha(), Some("aa218f56b14c9653891f9e74264a383fa43fefbd"));

    let pull = repo
        .create_pull("t", "", &git_ref, hubkit::RefSpec::default())
        .await
        .unwrap();
    assert_eq!(pull.number(), Some(2));
}

#[tokio::test]
async fn pull_request_needs_auth() {
    let (server, client) = setup().await;
    let repo = repository(
        &client,
        json!({"name": "demo", "owner": {"login": "alice"}}),
        Auth::None,
    );

    let err = repo.create_pull("t", "b", "feature", "master").await.unwrap_err();
    assert!(matches!(
        err,
        Error::AuthRequired { operation: "Repository::create_pull" }
    ));
    assert!(requests(&server).await.is_empty());
}

#[tokio::test]
async fn pull_request_head_without_name_is_refused() {
    let (server, client) = setup().await;
    let repo = fork(&client);

    let unnamed = hubkit::GitRef::new(
        client.clone(),
        Entity::from_value(json!({"object": {"sha": "1"}}), Auth::token("abc")),
        RepoRef::new("alice", "demo"),
    );
    let err = repo.create_pull("t", "b", &unnamed, "master").await.unwrap_err();
    assert!(matches!(err, Error::MissingField("ref")));

    let shaless = hubkit::GitCommit::new(
        client.clone(),
        Entity::from_value(json!({"message": "wip"}), Auth::token("abc")),
    );
    let err = repo.create_pull("t", "b", "feature", &shaless).await.unwrap_err();
    assert!(matches!(err, Error::MissingField("sha")));

    assert!(requests(&server).await.is_empty());
}

#[tokio::test]
async fn lookup_binds_owner() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "demo", "private": false})))
        .expect(1)
        .mount(&server)
        .await;

    let repo = client.repo("alice/demo", Auth::None).await.unwrap();
    assert_eq!(repo.login(), Some("alice"));
    assert_eq!(repo.repo_ref().unwrap(), RepoRef::new("alice", "demo"));
    assert!(repo.parent().is_none());

    for key in &["alice", "alice/", "/demo", "alice/demo/extra"] {
        match client.repo(key, Auth::None).await {
            Err(Error::InvalidRepoKey(k)) => assert_eq!(&k, key),
            other => panic!("unexpected {:?}", other.map(|r| r.into_entity())),
        }
    }
}

#[tokio::test]
async fn update_merges_response() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/repos/alice/demo"))
        .and(body_json(json!({"description": "A demo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "demo", "description": "A demo"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut repo = repository(
        &client,
        json!({"name": "demo", "owner": {"login": "alice"}, "forks": 3}),
        Auth::token("abc"),
    );
    repo.update(json!({"description": "A demo"})).await.unwrap();

    assert_eq!(repo.entity().str("description"), Some("A demo"));
    assert_eq!(repo.get("forks"), Some(&json!(3)));
    assert_eq!(repo.login(), Some("alice"));
}

#[tokio::test]
async fn contributors_and_languages() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/demo/contributors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"login": "alice", "contributions": 30},
            {"login": "bob", "contributions": 2}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/demo/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Rust": 1200, "Shell": 40})))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repository(
        &client,
        json!({"name": "demo", "owner": {"login": "alice"}}),
        Auth::token("abc"),
    );

    let contributors = repo.contributors().await.unwrap();
    assert_eq!(contributors["alice"].get("contributions"), Some(&json!(30)));
    assert_eq!(contributors["bob"].auth(), &Auth::token("abc"));

    let languages = repo.languages().await.unwrap();
    assert_eq!(languages["Rust"], json!(1200));

    let requests = requests(&server).await;
    assert_eq!(header(&requests[0], "authorization"), None);
    assert_eq!(header(&requests[1], "authorization"), Some("token abc"));
}

#[tokio::test]
async fn teams_keyed_by_id() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/site/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5, "name": "web"}])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repository(
        &client,
        json!({"name": "site", "owner": {"login": "acme"}}),
        Auth::token("abc"),
    );
    let teams = repo.teams().await.unwrap();
    assert_eq!(teams["5"].id(), Some(5));
}

#[tokio::test]
async fn git_refs() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/demo/git/refs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"ref": "refs/heads/master", "object": {"sha": "111"}},
            {"ref": "refs/tags/v1.0", "object": {"sha": "222"}},
            {"object": {"sha": "333"}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/alice/demo/git/refs/heads/master"))
        .and(body_json(json!({"sha": "444", "force": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": {"sha": "444"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/alice/demo/git/refs"))
        .and(body_json(json!({"ref": "refs/heads/topic", "sha": "111"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/topic",
            "object": {"sha": "111"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repository(
        &client,
        json!({"name": "demo", "owner": {"login": "alice"}}),
        Auth::token("abc"),
    );

    let mut refs = repo.git_refs().await.unwrap();
    assert_eq!(refs.len(), 3);
    assert_eq!(refs["refs/tags/v1.0"].sha(), Some("222"));
    assert_eq!(refs[MISSING_KEY].sha(), Some("333"));

    let master = refs.get_mut("refs/heads/master").unwrap();
    master.entity_mut().set("stale", true);
    master
        .update(json!({"sha": "444", "force": true}))
        .await
        .unwrap();
    assert_eq!(master.sha(), Some("444"));
    assert!(!master.entity().is_set("stale"));
    assert_eq!(master.repo(), &RepoRef::new("alice", "demo"));

    let topic = repo
        .create_git_ref(json!({"ref": "refs/heads/topic", "sha": "111"}))
        .await
        .unwrap();
    assert_eq!(topic.ref_name(), Some("refs/heads/topic"));
}

#[tokio::test]
async fn git_objects() {
    let (server, client) = setup().await;
    let tree = json!({
        "base_tree": "9fb037999f264ba9a7fc6274d15fa3ae2ab98312",
        "tree": [
            {"path": "a.txt", "mode": "100644", "type": "blob", "sha": "44b4fc6d56897b048c772eb4087f854f46256132"},
            {"path": "b.txt", "mode": "100644", "type": "blob", "content": "hello"},
            {"path": "c.txt", "mode": "100644", "blob": {"content": "inline", "encoding": "utf-8"}}
        ]
    });
    Mock::given(method("POST"))
        .and(path("/repos/alice/demo/git/trees"))
        .and(body_json(tree.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sha": "cd8274d1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/alice/demo/git/blobs"))
        .and(body_json(json!({"content": "hello", "encoding": "utf-8"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sha": "3a0f86fb"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/alice/demo/git/commits"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sha": "7638417d"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/demo/git/commits/7638417d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sha": "7638417d", "message": "init"})))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repository(
        &client,
        json!({"name": "demo", "owner": {"login": "alice"}}),
        Auth::token("abc"),
    );

    let created = repo.create_git_tree(tree).await.unwrap();
    assert_eq!(created.sha(), Some("cd8274d1"));

    let blob = repo
        .create_git_blob(json!({"content": "hello", "encoding": "utf-8"}))
        .await
        .unwrap();
    assert_eq!(blob.sha(), Some("3a0f86fb"));

    let commit = repo
        .create_git_commit(json!({"message": "init", "tree": "cd8274d1"}))
        .await
        .unwrap();
    assert_eq!(commit.sha(), Some("7638417d"));

    let fetched = repo.git_commit("7638417d").await.unwrap();
    assert_eq!(fetched.get("message"), Some(&json!("init")));

    let anonymous = repository(
        &client,
        json!({"name": "demo", "owner": {"login": "alice"}}),
        Auth::None,
    );
    assert!(matches!(
        anonymous.create_git_blob(json!({})).await,
        Err(Error::AuthRequired { .. })
    ));
}

#[tokio::test]
async fn pulls_are_bound_to_repo() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/repos/alice/demo/pulls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"number": 2, "title": "second"},
            {"number": 1, "title": "first"}
        ])))
        .mount(&server)
        .await;

    let repo = repository(
        &client,
        json!({"name": "demo", "owner": {"login": "alice"}}),
        Auth::None,
    );
    let pulls = repo.pulls().await.unwrap();

    assert_eq!(
        pulls.iter().map(|p| p.number()).collect::<Vec<_>>(),
        vec![Some(2), Some(1)]
    );
    assert!(pulls.iter().all(|p| p.repo() == &RepoRef::new("alice", "demo")));
}

#[tokio::test]
async fn missing_owner_fails_fast() {
    let (server, client) = setup().await;
    let repo = repository(&client, json!({"name": "demo"}), Auth::token("abc"));

    assert!(matches!(
        repo.languages().await,
        Err(Error::MissingField("owner.login"))
    ));
    assert!(requests(&server).await.is_empty());
}
