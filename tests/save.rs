//! Local mutation, save, reload, and write-side error mapping.

use redmine_api::{Redmine, RedmineError};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project_json() -> serde_json::Value {
    serde_json::json!({"id": 1, "name": "Test 1", "identifier": "test_1"})
}

#[tokio::test]
async fn test_save_puts_current_field_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/projects/1.json"))
        .and(body_partial_json(serde_json::json!({
            "project": {"id": 1, "name": "Test Foo"}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let redmine = Redmine::new(&server.uri()).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();

    // Mutation is local until save().
    project.update(|p| p.name = "Test Foo".to_string());
    assert_eq!(project.read().name, "Test Foo");

    project.save().await.unwrap();
}

#[tokio::test]
async fn test_mutation_without_save_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let redmine = Redmine::new(&server.uri()).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();
    project.update(|p| p.name = "Local only".to_string());
}

#[tokio::test]
async fn test_save_surfaces_validation_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "errors": ["Name cannot be blank"]
        })))
        .mount(&server)
        .await;

    let redmine = Redmine::new(&server.uri()).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();
    project.update(|p| p.name = String::new());

    let err = project.save().await.unwrap_err();
    match err {
        RedmineError::Validation { errors } => {
            assert_eq!(errors, vec!["Name cannot be blank".to_string()]);
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_save_surfaces_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let redmine = Redmine::new(&server.uri()).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();

    let err = project.save().await.unwrap_err();
    match err {
        RedmineError::Api { status_code, .. } => assert_eq!(status_code, Some(500)),
        other => panic!("expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn test_reload_refreshes_shared_entry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "name": "Renamed upstream",
            "identifier": "test_1"
        })))
        .mount(&server)
        .await;

    let redmine = Redmine::new(&server.uri()).unwrap();
    let project = redmine.projects().unwrap().get(1).await.unwrap();
    let alias = redmine.projects().unwrap().get("test_1").await.unwrap();
    assert_eq!(project.read().name, "Test 1");

    project.reload().await.unwrap();
    assert_eq!(project.read().name, "Renamed upstream");
    // The aliased handle shares storage and sees the refresh too.
    assert_eq!(alias.read().name, "Renamed upstream");
}
