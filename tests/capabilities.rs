//! Capability-flag gated relations: memberships (1.4+) and wiki pages
//! (2.2+).

use redmine_api::{ApiVersion, Redmine, RedmineError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project_json() -> serde_json::Value {
    serde_json::json!({"id": 1, "name": "Test 1", "identifier": "test_1"})
}

async fn mount_project(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_memberships_available_from_1_4() {
    let server = MockServer::start().await;
    mount_project(&server).await;
    Mock::given(method("GET"))
        .and(path("/projects/1/memberships.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "memberships": [{
                "id": 1,
                "project": {"id": 1, "name": "Test 1"},
                "user": {"id": 17, "name": "John Smith"},
                "roles": [{"id": 1, "name": "Manager"}]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let redmine = Redmine::with_version(&server.uri(), ApiVersion::new(1, 4)).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();
    let memberships = project.memberships(&redmine).await.unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0]["user"]["name"], "John Smith");
}

#[tokio::test]
async fn test_memberships_gated_below_1_4() {
    let server = MockServer::start().await;
    mount_project(&server).await;

    let redmine = Redmine::with_version(&server.uri(), ApiVersion::new(1, 1)).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();
    let err = project.memberships(&redmine).await.unwrap_err();
    assert!(matches!(err, RedmineError::Unsupported { .. }));
}

#[tokio::test]
async fn test_wiki_pages_available_from_2_2() {
    let server = MockServer::start().await;
    mount_project(&server).await;
    Mock::given(method("GET"))
        .and(path("/projects/1/wiki/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "wiki_pages": [
                {"title": "CookBook_documentation", "version": 3},
                {"title": "Another_page", "version": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let redmine = Redmine::new(&server.uri()).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();
    let pages = project.wiki_pages(&redmine).await.unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["title"], "CookBook_documentation");
}

#[tokio::test]
async fn test_wiki_pages_gated_below_2_2() {
    let server = MockServer::start().await;
    mount_project(&server).await;

    let redmine = Redmine::with_version(&server.uri(), ApiVersion::new(1, 4)).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();
    let err = project.wiki_pages(&redmine).await.unwrap_err();
    assert!(matches!(err, RedmineError::Unsupported { .. }));
}
