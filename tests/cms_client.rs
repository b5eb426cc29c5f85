mod common;

use httpmock::MockServer;
use spacetraveling::cms::{CmsClient, CmsError, Predicate, QueryOptions};
use spacetraveling::config::CmsConfig;
use spacetraveling::content::Listing;

use common::{api_root, endpoint, search_page, summary_doc, MASTER_REF};

fn cms_config(server: &MockServer, page_size: usize) -> CmsConfig {
    CmsConfig {
        endpoint: endpoint(server),
        access_token: None,
        post_type: "posts".to_string(),
        page_size,
    }
}

#[tokio::test]
async fn query_uses_master_ref_and_page_size() -> Result<(), CmsError> {
    let server = MockServer::start();
    api_root(&server);
    let search = server.mock(|when, then| {
        when.method("GET")
            .path("/api/v2/documents/search")
            .query_param("ref", MASTER_REF)
            .query_param("pageSize", "2")
            .query_param("access_token", "secret");
        then.status(200)
            .header("content-type", "application/json")
            .body(search_page(
                vec![summary_doc("a", "First"), summary_doc("b", "Second")],
                Some("https://cms.example/next".to_string()),
            ));
    });

    let client = CmsClient::new(&endpoint(&server), Some("secret".to_string()))?;
    let response = client
        .query(&[Predicate::document_type("posts")], &QueryOptions::page_size(2))
        .await?;

    search.assert();
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].uid.as_deref(), Some("a"));
    assert_eq!(response.next_page.as_deref(), Some("https://cms.example/next"));
    Ok(())
}

#[tokio::test]
async fn get_by_uid_reports_missing_documents() -> Result<(), CmsError> {
    let server = MockServer::start();
    api_root(&server);
    server.mock(|when, then| {
        when.method("GET")
            .path("/api/v2/documents/search")
            .query_param("pageSize", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body(search_page(vec![], None));
    });

    let client = CmsClient::new(&endpoint(&server), None)?;
    let err = client
        .get_by_uid("posts", "ghost")
        .await
        .expect_err("no document should be found");
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), r#"no posts document with uid "ghost""#);
    Ok(())
}

#[tokio::test]
async fn error_status_is_surfaced() -> Result<(), CmsError> {
    let server = MockServer::start();
    api_root(&server);
    server.mock(|when, then| {
        when.method("GET").path("/api/v2/documents/search");
        then.status(500).body("boom");
    });

    let client = CmsClient::new(&endpoint(&server), None)?;
    let err = client
        .query(&[], &QueryOptions::default())
        .await
        .expect_err("server error should fail");
    assert!(matches!(err, CmsError::Status { status: 500, ref body } if body == "boom"));
    Ok(())
}

#[tokio::test]
async fn missing_master_ref_fails() -> Result<(), CmsError> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/v2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"refs":[{"id":"preview","ref":"p","label":"Preview","isMasterRef":false}]}"#);
    });

    let client = CmsClient::new(&endpoint(&server), None)?;
    let err = client
        .query(&[], &QueryOptions::default())
        .await
        .expect_err("no master ref");
    assert!(matches!(err, CmsError::NoMasterRef));
    Ok(())
}

#[tokio::test]
async fn load_more_follows_cursor_until_exhausted() -> Result<(), CmsError> {
    let server = MockServer::start();
    api_root(&server);
    server.mock(|when, then| {
        when.method("GET")
            .path("/api/v2/documents/search")
            .query_param("pageSize", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(search_page(
                vec![summary_doc("a", "First"), summary_doc("b", "Second")],
                Some(server.url("/next/2")),
            ));
    });
    let next = server.mock(|when, then| {
        when.method("GET").path("/next/2");
        then.status(200)
            .header("content-type", "application/json")
            .body(search_page(vec![summary_doc("c", "Third")], None));
    });

    let client = CmsClient::new(&endpoint(&server), None)?;
    let mut listing = Listing::fetch_first(&client, &cms_config(&server, 2)).await?;
    assert_eq!(listing.posts().len(), 2);
    assert!(listing.has_more());

    let added = listing.load_more(&client).await?;
    assert_eq!(added, 1);
    assert!(!listing.has_more());
    let titles: Vec<_> = listing
        .posts()
        .iter()
        .map(|p| p.data.title.as_str())
        .collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);

    // Without a cursor nothing is requested
    assert_eq!(listing.load_more(&client).await?, 0);
    next.assert();
    Ok(())
}
