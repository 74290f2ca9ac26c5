// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Integration tests for UnityCatalogProvider using wiremock to mock the REST API.

use delta_glue_sync_catalog::{
    DataSourceFormat, SourceCatalog, TableIdent, UnityCatalogConfig, UnityCatalogProvider,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_provider(server: &MockServer) -> UnityCatalogProvider {
    let config = UnityCatalogConfig::new(server.uri(), "main");
    UnityCatalogProvider::new(config).unwrap()
}

// ---- list_tables ----

#[tokio::test]
async fn test_list_tables() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables"))
        .and(query_param("catalog_name", "main"))
        .and(query_param("schema_name", "analytics_prod"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tables": [
                { "name": "events", "catalog_name": "main", "schema_name": "analytics_prod", "data_source_format": "DELTA" },
                { "name": "users", "catalog_name": "main", "schema_name": "analytics_prod", "data_source_format": "PARQUET" }
            ]
        })))
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    let tables = provider.list_tables("analytics_prod").await.unwrap();

    assert_eq!(
        tables,
        vec![
            TableIdent::new("analytics_prod", "events"),
            TableIdent::new("analytics_prod", "users"),
        ]
    );
}

#[tokio::test]
async fn test_list_tables_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    assert!(provider.list_tables("empty").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_tables_follows_page_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables"))
        .and(query_param("page_token", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tables": [ { "name": "c", "schema_name": "s" } ],
            "next_page_token": ""
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tables"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tables": [
                { "name": "a", "schema_name": "s" },
                { "name": "b", "schema_name": "s" }
            ],
            "next_page_token": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    let names: Vec<_> = provider
        .list_tables("s")
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_list_tables_schema_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    let err = provider.list_tables("missing").await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

// ---- describe_table ----

#[tokio::test]
async fn test_describe_table() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables/main.analytics_prod.events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "events",
            "catalog_name": "main",
            "schema_name": "analytics_prod",
            "table_type": "EXTERNAL",
            "data_source_format": "DELTA",
            "storage_location": "s3://bucket/events",
            "columns": [
                { "name": "id", "type_name": "LONG", "position": 0 }
            ]
        })))
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    let detail = provider
        .describe_table(&TableIdent::new("analytics_prod", "events"))
        .await
        .unwrap();

    assert_eq!(detail.ident, TableIdent::new("analytics_prod", "events"));
    assert_eq!(detail.format, DataSourceFormat::Delta);
    assert_eq!(detail.location.as_deref(), Some("s3://bucket/events"));
}

#[tokio::test]
async fn test_describe_view_without_location() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables/main.s.v"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "v",
            "schema_name": "s",
            "table_type": "VIEW"
        })))
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    let detail = provider
        .describe_table(&TableIdent::new("s", "v"))
        .await
        .unwrap();
    assert_eq!(detail.format, DataSourceFormat::Other("UNKNOWN".to_string()));
    assert_eq!(detail.location, None);
}

#[tokio::test]
async fn test_describe_table_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables/main.default.nonexistent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    let err = provider
        .describe_table(&TableIdent::new("default", "nonexistent"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_describe_table_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables/main.s.t"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    let err = provider
        .describe_table(&TableIdent::new("s", "t"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid response"));
}

// ---- data source format parsing ----

#[tokio::test]
async fn test_data_source_format_parsing() {
    let server = MockServer::start().await;

    let cases = [
        ("t1", Some("DELTA"), DataSourceFormat::Delta),
        ("t2", Some("PARQUET"), DataSourceFormat::Parquet),
        ("t3", Some("CSV"), DataSourceFormat::Csv),
        ("t4", Some("JSON"), DataSourceFormat::Json),
        ("t5", Some("AVRO"), DataSourceFormat::Avro),
        ("t6", Some("ORC"), DataSourceFormat::Orc),
        (
            "t7",
            Some("CUSTOM_FORMAT"),
            DataSourceFormat::Other("CUSTOM_FORMAT".to_string()),
        ),
        ("t8", None, DataSourceFormat::Other("UNKNOWN".to_string())),
    ];

    for (name, format, _) in &cases {
        let mut body = serde_json::json!({ "name": name, "schema_name": "s" });
        if let Some(format) = format {
            body["data_source_format"] = serde_json::json!(format);
        }
        Mock::given(method("GET"))
            .and(path(format!("/tables/main.s.{}", name)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
    }

    let provider = setup_provider(&server).await;
    for (name, _, expected) in cases {
        let detail = provider
            .describe_table(&TableIdent::new("s", name))
            .await
            .unwrap();
        assert_eq!(detail.format, expected, "table {name}");
    }
}

// ---- auth error ----

#[tokio::test]
async fn test_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let provider = setup_provider(&server).await;
    let err = provider.list_tables("s").await.unwrap_err();
    assert!(err.to_string().contains("Auth error"));
}

// ---- bearer token is sent ----

#[tokio::test]
async fn test_bearer_token_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tables"))
        .and(header("Authorization", "Bearer my-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tables": [{ "name": "events", "schema_name": "s" }]
        })))
        .mount(&server)
        .await;

    let config = UnityCatalogConfig::new(server.uri(), "main").with_token("my-token");
    let provider = UnityCatalogProvider::new(config).unwrap();
    let tables = provider.list_tables("s").await.unwrap();

    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].name, "events");
}

// ---- connection error ----

#[tokio::test]
async fn test_connection_error_on_bad_url() {
    let config = UnityCatalogConfig::new("http://localhost:1", "main").with_timeout(1);
    let provider = UnityCatalogProvider::new(config).unwrap();
    let err = provider.list_tables("s").await.unwrap_err();
    assert!(err.to_string().contains("connection error"));
}
