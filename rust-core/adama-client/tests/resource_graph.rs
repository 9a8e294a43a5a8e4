// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Resource graph and endpoint behaviour against a scripted transport.
//!
//! Request counts on the transport show when handles actually go to the
//! network.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use adama_client::{
    AdamaError, EndpointOutput, Handle, Method, NewNamespace, ProvFormat, ProvKind, Provenance,
    RawResponse, Request, ServiceState, DELETED, PROVENANCE_REL,
};
use reqwest::header::{HeaderValue, LINK};
use serde_json::{json, Value};

use common::*;

const PROV_URL: &str = "http://prov.test/prov/42";

/// A platform with namespace `ns` holding service `genes` of `service_type`.
fn platform(service_type: &'static str) -> impl Fn(&Request) -> RawResponse + Send + Sync {
    move |request: &Request| {
        if request.url.starts_with(PROV_URL) {
            return provenance(request);
        }
        match (request.method, path_of(request)) {
            (Method::Get, "/ns") => success(json!({"name": "ns", "url": "http://ns.example"})),
            (Method::Get, "/ns/genes_v0.1") => success(json!({
                "service": {"name": "genes", "type": service_type, "version": "0.1"}
            })),
            (Method::Get, "/ns/genes_v0.1/search") => success(json!([1, 2, 3])).with_header(
                LINK,
                HeaderValue::from_str(&format!(r#"<{PROV_URL}>; rel="{PROVENANCE_REL}""#))
                    .unwrap(),
            ),
            (Method::Get, "/ns/genes_v0.1/bare") => success(json!([{"id": 1}])),
            (Method::Get, "/ns/genes_v0.1/single") => success(json!({"id": 7})),
            (Method::Get, "/ns/genes_v0.1/broken") => RawResponse::new(500, "kaboom"),
            (Method::Get, "/ns/genes_v0.1/refused") => failure("bad query"),
            (Method::Get, "/ns/genes_v0.1/image") => RawResponse::new(200, vec![1u8, 2, 3]),
            _ => not_found(),
        }
    }
}

fn provenance(request: &Request) -> RawResponse {
    match request.query_param("format") {
        Some("json") | Some("prov") => json_response(
            200,
            json!({
                "prefix": {"adama": "http://adama.example/"},
                "entity": {"adama:result": {"prov:label": "result"}},
                "activity": {"adama:call": {}},
                "wasGeneratedBy": {"_:g1": {"prov:entity": "adama:result", "prov:activity": "adama:call"}}
            }),
        ),
        Some("sources") => json_response(200, json!([{"source": "upstream"}])),
        Some("prov-n") => RawResponse::new(200, "document\n  entity(adama:result)\nendDocument"),
        Some("png") => RawResponse::new(200, vec![0x89, b'P', b'N', b'G']),
        _ => RawResponse::new(400, "unknown format"),
    }
}

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

#[test]
fn test_handles_are_created_without_requests() {
    let transport = ScriptedTransport::new(platform("query"));
    let adama = client(&transport);

    let ns = adama.lookup("ns").into_namespace().unwrap();
    let service = ns.service("genes");
    let endpoint = service.endpoint("search");

    assert_eq!(ns.name(), "ns");
    assert_eq!(endpoint.path(), "/ns/genes_v0.1/search");
    assert_eq!(transport.count(), 0);
}

#[test]
fn test_private_key_never_loads_namespace() {
    let transport = ScriptedTransport::new(platform("query"));
    let mut ns = client(&transport).namespace("ns");

    assert_eq!(ns.field("_cache").unwrap(), None);
    assert!(matches!(ns.get("_cache").unwrap(), Handle::Service(_)));
    assert!(!ns.is_loaded());
    assert_eq!(transport.count(), 0);
}

#[test]
fn test_namespace_preloads_once() {
    let transport = ScriptedTransport::new(platform("query"));
    let mut ns = client(&transport).namespace("ns");

    assert_eq!(ns.field("url").unwrap(), Some(&json!("http://ns.example")));
    assert_eq!(ns.field("name").unwrap(), Some(&json!("ns")));
    assert_eq!(
        ns.get("url").unwrap().as_field(),
        Some(&json!("http://ns.example"))
    );
    assert_eq!(transport.count_of(Method::Get, "/ns"), 1);
    assert_eq!(transport.count(), 1);
}

#[test]
fn test_unknown_namespace_key_is_a_service() {
    let transport = ScriptedTransport::new(platform("query"));
    let mut ns = client(&transport).namespace("ns");

    let service = ns.get("genes").unwrap().into_service().unwrap();
    assert_eq!(service.full_name(), "/ns/genes_v0.1");
    // Only the namespace itself was fetched; the service is still lazy.
    assert_eq!(transport.count(), 1);
    assert!(!service.is_loaded());
}

#[test]
fn test_namespace_failure_envelope() {
    let transport = ScriptedTransport::new(|_: &Request| failure("no such namespace"));
    let mut ns = client(&transport).namespace("missing");

    match ns.field("url") {
        Err(AdamaError::Api { message, context }) => {
            assert_eq!(message, "no such namespace");
            assert_eq!(context.unwrap()["status"], "error");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[test]
fn test_requests_carry_bearer_token() {
    let transport = ScriptedTransport::new(platform("query"));
    client(&transport).namespace("ns").field("url").unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].bearer.as_deref(), Some(TOKEN));
    assert_eq!(requests[0].url, "http://adama.test/ns");
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[test]
fn test_service_fields_and_endpoints() {
    let transport = ScriptedTransport::new(platform("query"));
    let mut service = client(&transport).namespace("ns").service("genes");

    assert_eq!(service.get("type").unwrap().as_field(), Some(&json!("query")));
    assert_eq!(service.service_type(), Some("query"));
    let endpoint = service.get("search").unwrap().into_endpoint().unwrap();
    assert_eq!(endpoint.name(), "search");
    assert_eq!(transport.count_of(Method::Get, "/ns/genes_v0.1"), 1);
}

#[test]
fn test_service_private_key_is_local() {
    let transport = ScriptedTransport::new(platform("query"));
    let mut service = client(&transport).namespace("ns").service("genes");

    assert!(service.get("_internal").unwrap().is_missing());
    assert_eq!(service.field("_internal").unwrap(), None);
    assert_eq!(transport.count(), 0);
}

#[test]
fn test_errored_service_is_terminal() {
    let transport = ScriptedTransport::new(|request: &Request| match path_of(request) {
        "/ns/bad_v0.1" => success(json!({"slot": "error", "msg": "import failed"})),
        _ => not_found(),
    });
    let mut service = client(&transport).namespace("ns").service("bad");

    assert!(service.get("search").unwrap().is_missing());
    assert_eq!(service.error_message(), Some("import failed"));
    assert!(service.get("type").unwrap().is_missing());
    assert_eq!(
        service.state(),
        &ServiceState::Errored("import failed".to_string())
    );
    assert_eq!(transport.count(), 1);

    match service.endpoint("search").call(&[]) {
        Err(AdamaError::Api { message, .. }) => assert_eq!(message, "import failed"),
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[test]
fn test_pending_service_loads_on_a_later_attempt() {
    let calls = AtomicUsize::new(0);
    let transport = ScriptedTransport::new(move |_: &Request| {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            success(json!({"service": null}))
        } else {
            success(json!({"service": {"name": "genes", "type": "query"}}))
        }
    });
    let mut service = client(&transport).namespace("ns").service("genes");

    assert_eq!(service.ensure_loaded().unwrap(), &ServiceState::Unloaded);
    assert!(service.get("type").unwrap().as_field().is_some());
    assert!(service.is_loaded());
    assert_eq!(transport.count(), 2);

    // Loaded handles do not ask again.
    service.field("name").unwrap();
    assert_eq!(transport.count(), 2);
}

#[test]
fn test_with_version_returns_fresh_handle() {
    let transport = ScriptedTransport::new(platform("query"));
    let mut service = client(&transport).namespace("ns").service("genes");
    service.ensure_loaded().unwrap();

    let other = service.with_version("0.2");
    assert_eq!(other.full_name(), "/ns/genes_v0.2");
    assert_eq!(other.version(), "0.2");
    assert!(!other.is_loaded());
    assert!(service.is_loaded());
    assert_eq!(service.version(), "0.1");
}

// ---------------------------------------------------------------------------
// Endpoint calls and provenance
// ---------------------------------------------------------------------------

#[test]
fn test_query_endpoint_wraps_results() {
    let transport = ScriptedTransport::new(platform("query"));
    let service = client(&transport).namespace("ns").service("genes");

    let rows = service
        .endpoint("search")
        .call(&[("q", "AT1G01010")])
        .unwrap()
        .into_results()
        .unwrap();

    assert_eq!(rows, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.prov_url(), Some(PROV_URL));

    let call = transport
        .requests()
        .into_iter()
        .find(|r| path_of(r) == "/ns/genes_v0.1/search")
        .unwrap();
    assert_eq!(call.query_param("q"), Some("AT1G01010"));
}

#[test]
fn test_map_filter_endpoint_without_link() {
    let transport = ScriptedTransport::new(platform("map_filter"));
    let service = client(&transport).namespace("ns").service("genes");

    let rows = service
        .endpoint("bare")
        .call(&[])
        .unwrap()
        .into_results()
        .unwrap();
    assert_eq!(rows.items(), &[json!({"id": 1})]);
    assert_eq!(rows.prov_url(), None);

    let err = rows.prov(ProvFormat::Json).unwrap_err();
    assert!(err.is_domain());
    assert_eq!(err.to_string(), "no provenance information found");
}

#[test]
fn test_single_result_becomes_one_item() {
    let transport = ScriptedTransport::new(platform("query"));
    let service = client(&transport).namespace("ns").service("genes");

    let rows = service.endpoint("single").call(&[]).unwrap().into_results().unwrap();
    assert_eq!(rows.into_items(), vec![json!({"id": 7})]);
}

#[test]
fn test_passthrough_endpoint_returns_raw_response() {
    let transport = ScriptedTransport::new(platform("passthrough"));
    let service = client(&transport).namespace("ns").service("genes");

    match service.endpoint("image").call(&[]).unwrap() {
        EndpointOutput::Raw(response) => assert_eq!(response.body, vec![1, 2, 3]),
        EndpointOutput::Results(rows) => panic!("Expected raw response, got {:?}", rows),
    }
}

#[test]
fn test_endpoint_http_error_carries_body() {
    let transport = ScriptedTransport::new(platform("query"));
    let service = client(&transport).namespace("ns").service("genes");

    match service.endpoint("broken").call(&[]) {
        Err(AdamaError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "kaboom");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[test]
fn test_endpoint_failure_envelope() {
    let transport = ScriptedTransport::new(platform("query"));
    let service = client(&transport).namespace("ns").service("genes");

    let err = service.endpoint("refused").call(&[]).unwrap_err();
    assert!(err.is_domain());
    assert_eq!(err.to_string(), "bad query");
}

#[test]
fn test_endpoint_on_pending_service() {
    let transport = ScriptedTransport::new(|_: &Request| success(json!({"service": null})));
    let service = client(&transport).namespace("ns").service("genes");

    let err = service.endpoint("search").call(&[]).unwrap_err();
    assert_eq!(err.to_string(), "service /ns/genes_v0.1 is not available");
}

#[test]
fn test_provenance_formats() {
    let transport = ScriptedTransport::new(platform("query"));
    let service = client(&transport).namespace("ns").service("genes");
    let rows = service.endpoint("search").call(&[]).unwrap().into_results().unwrap();

    match rows.prov(ProvFormat::Json).unwrap() {
        Provenance::Json(value) => assert!(value.get("entity").is_some()),
        other => panic!("Expected JSON provenance, got {:?}", other),
    }
    match rows.prov(ProvFormat::Sources).unwrap() {
        Provenance::Json(value) => assert_eq!(value[0]["source"], "upstream"),
        other => panic!("Expected JSON sources, got {:?}", other),
    }
    match rows.prov(ProvFormat::ProvN).unwrap() {
        Provenance::Text(text) => assert!(text.starts_with("document")),
        other => panic!("Expected PROV-N text, got {:?}", other),
    }
    match rows.prov(ProvFormat::Prov).unwrap() {
        Provenance::Document(doc) => {
            assert_eq!(doc.entities().len(), 1);
            assert_eq!(doc.records_of(ProvKind::WasGeneratedBy).count(), 1);
            assert_eq!(doc.prefixes()["adama"], "http://adama.example/");
        }
        other => panic!("Expected PROV document, got {:?}", other),
    }
    match rows.prov(ProvFormat::Png).unwrap() {
        Provenance::Image(bytes) => assert_eq!(&bytes[1..4], b"PNG"),
        other => panic!("Expected image, got {:?}", other),
    }
}

#[test]
fn test_provenance_fetch_is_unauthenticated() {
    let transport = ScriptedTransport::new(platform("query"));
    let service = client(&transport).namespace("ns").service("genes");
    let rows = service.endpoint("search").call(&[]).unwrap().into_results().unwrap();
    rows.prov(ProvFormat::ProvN).unwrap();

    let fetch = transport.requests().pop().unwrap();
    assert_eq!(fetch.url, PROV_URL);
    assert_eq!(fetch.bearer, None);
    assert_eq!(fetch.query_param("format"), Some("prov-n"));
}

#[test]
fn test_save_provenance_image() {
    let transport = ScriptedTransport::new(platform("query"));
    let service = client(&transport).namespace("ns").service("genes");
    let rows = service.endpoint("search").call(&[]).unwrap().into_results().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prov.png");
    rows.save_prov(ProvFormat::Png, &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, b'P', b'N', b'G']);
}

// ---------------------------------------------------------------------------
// Listings, creation and deletion
// ---------------------------------------------------------------------------

#[test]
fn test_status_and_namespace_listing() {
    let transport = ScriptedTransport::new(|request: &Request| match path_of(request) {
        "/status" => success(json!({"api": "Adama v0.3"})),
        "/namespaces" => success(json!([{"name": "ns"}, {"name": "other"}])),
        _ => not_found(),
    });
    let adama = client(&transport);

    assert_eq!(adama.status().unwrap()["result"]["api"], "Adama v0.3");
    let names: Vec<String> = adama
        .namespaces()
        .unwrap()
        .iter()
        .map(|ns| ns.name().to_string())
        .collect();
    assert_eq!(names, vec!["ns", "other"]);
}

#[test]
fn test_add_namespace_posts_form() {
    let transport = ScriptedTransport::new(|request: &Request| match request.method {
        Method::Post => success(Value::Null),
        _ => not_found(),
    });
    let adama = client(&transport);

    let new_ns = NewNamespace {
        description: Some("plant genomics".to_string()),
        ..NewNamespace::new("plants")
    };
    let ns = adama.add_namespace(&new_ns).unwrap();
    assert_eq!(ns.name(), "plants");

    let post = transport.requests().pop().unwrap();
    assert_eq!(path_of(&post), "/namespaces");
    assert_eq!(post.form_field("name"), Some("plants"));
    assert_eq!(post.form_field("description"), Some("plant genomics"));
    assert_eq!(post.form_field("url"), None);
    assert!(post.files.is_empty());
}

#[test]
fn test_add_namespace_rejected() {
    let transport = ScriptedTransport::new(|_: &Request| failure("namespace exists"));
    let err = client(&transport)
        .add_namespace(&NewNamespace::new("ns"))
        .unwrap_err();
    assert_eq!(err.to_string(), "namespace exists");
}

#[test]
fn test_services_listing_keeps_versions() {
    let transport = ScriptedTransport::new(|request: &Request| match path_of(request) {
        "/ns/services" => success(json!([
            {"name": "genes", "version": "0.2"},
            {"name": "loci", "version": 1.5},
            {"name": "legacy"}
        ])),
        _ => not_found(),
    });
    let services = client(&transport).namespace("ns").services().unwrap();

    let names: Vec<String> = services.iter().map(|s| s.full_name()).collect();
    assert_eq!(
        names,
        vec!["/ns/genes_v0.2", "/ns/loci_v1.5", "/ns/legacy_v0.1"]
    );
}

#[test]
fn test_delete_invalidates_handles() {
    let transport = ScriptedTransport::new(|request: &Request| match request.method {
        Method::Delete => success(Value::Null),
        _ => success(json!({"service": {"name": "genes", "type": "query"}})),
    });
    let adama = client(&transport);

    let mut service = adama.namespace("ns").service("genes");
    service.ensure_loaded().unwrap();
    service.delete().unwrap();
    assert_eq!(service.name(), DELETED);
    assert!(!service.is_loaded());
    assert_eq!(transport.count_of(Method::Delete, "/ns/genes_v0.1"), 1);

    let mut ns = adama.namespace("ns");
    ns.ensure_loaded().unwrap();
    ns.delete().unwrap();
    assert_eq!(ns.name(), DELETED);
    assert!(ns.info().is_none());
    assert_eq!(transport.count_of(Method::Delete, "/ns"), 1);
}
