#![allow(dead_code)]

use httpmock::MockServer;
use serde_json::{json, Value};

pub const MASTER_REF: &str = "master-ref";

pub fn api_root(server: &MockServer) {
    server.mock(|when, then| {
        when.method("GET").path("/api/v2");
        then.status(200)
            .header("content-type", "application/json")
            .body(
                json!({
                    "refs": [
                        {"id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true}
                    ]
                })
                .to_string(),
            );
    });
}

pub fn endpoint(server: &MockServer) -> String {
    server.url("/api/v2")
}

pub fn summary_doc(uid: &str, title: &str) -> Value {
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": "2021-03-15T19:25:28+0000",
        "last_publication_date": "2021-03-16T10:00:00+0000",
        "data": {
            "title": title,
            "subtitle": format!("{} subtitle", title),
            "author": "Joseph Oliveira"
        }
    })
}

pub fn post_doc(uid: &str, title: &str) -> Value {
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": "2021-03-25T19:25:28+0000",
        "data": {
            "title": title,
            "subtitle": "Pensando em sincronização",
            "author": "Joseph Oliveira",
            "banner": {"url": "https://images.example/banner.png"},
            "content": [
                {
                    "heading": "Proin et varius",
                    "body": [
                        {"type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [
                            {"start": 0, "end": 5, "type": "strong"}
                        ]}
                    ]
                }
            ]
        }
    })
}

pub fn search_page(results: Vec<Value>, next_page: Option<String>) -> String {
    json!({
        "page": 1,
        "results_per_page": results.len(),
        "results_size": results.len(),
        "total_results_size": results.len(),
        "total_pages": 1,
        "next_page": next_page,
        "prev_page": null,
        "results": results
    })
    .to_string()
}
