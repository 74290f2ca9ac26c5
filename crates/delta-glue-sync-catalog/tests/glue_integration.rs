// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Integration tests for GlueCatalog against a wiremock stand-in for the Glue
//! JSON API (`POST /` with an `x-amz-target` header per operation).

use std::sync::Arc;

use delta_glue_sync_catalog::{
    AwsCredentials, CatalogError, DataSourceFormat, GlueCatalog, GlueConfig, Registrar,
    RegistrationOutcome, SourceColumn, TableLookup, TargetCatalog,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Match, Mock, MockServer, ResponseTemplate};

const AMZ_JSON: &str = "application/x-amz-json-1.1";

fn glue_for(server: &MockServer) -> GlueCatalog {
    let config = GlueConfig::new("us-east-1").with_endpoint_url(server.uri());
    GlueCatalog::new(&config, &AwsCredentials::new("AKIATEST", "secret"))
}

fn target(operation: &str) -> impl Match {
    header("x-amz-target", format!("AWSGlue.{}", operation).as_str())
}

fn json_response(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.to_string(), AMZ_JSON)
}

fn entity_not_found() -> ResponseTemplate {
    json_response(
        400,
        serde_json::json!({
            "__type": "EntityNotFoundException",
            "Message": "Table analytics_prod__events not found."
        }),
    )
}

// ---- get_table ----

#[tokio::test]
async fn test_get_table_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(target("GetTable"))
        .and(body_partial_json(serde_json::json!({
            "DatabaseName": "uc_delta_mirror",
            "Name": "analytics_prod__events"
        })))
        .respond_with(json_response(
            200,
            serde_json::json!({
                "Table": {
                    "Name": "analytics_prod__events",
                    "DatabaseName": "uc_delta_mirror",
                    "TableType": "EXTERNAL_TABLE",
                    "Parameters": { "classification": "delta" },
                    "StorageDescriptor": {
                        "Columns": [ { "Name": "id", "Type": "bigint" } ],
                        "Location": "s3://bucket/events",
                        "StoredAsSubDirectories": false
                    }
                }
            }),
        ))
        .mount(&server)
        .await;

    let glue = glue_for(&server);
    let lookup = glue
        .get_table("uc_delta_mirror", "analytics_prod__events")
        .await
        .unwrap();

    match lookup {
        TableLookup::Found(def) => {
            assert_eq!(def.name, "analytics_prod__events");
            assert_eq!(def.location, "s3://bucket/events");
            assert_eq!(def.classification(), Some("delta"));
            assert_eq!(def.columns.len(), 1);
            assert_eq!(def.columns[0].data_type, "bigint");
        }
        TableLookup::Absent => panic!("expected table to be found"),
    }
}

#[tokio::test]
async fn test_get_table_entity_not_found_is_absent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(target("GetTable"))
        .respond_with(entity_not_found())
        .mount(&server)
        .await;

    let glue = glue_for(&server);
    let lookup = glue
        .get_table("uc_delta_mirror", "analytics_prod__events")
        .await
        .unwrap();
    assert_eq!(lookup, TableLookup::Absent);
}

#[tokio::test]
async fn test_get_table_access_denied_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(target("GetTable"))
        .respond_with(json_response(
            400,
            serde_json::json!({
                "__type": "AccessDeniedException",
                "Message": "not authorized"
            }),
        ))
        .mount(&server)
        .await;

    let glue = glue_for(&server);
    let err = glue.get_table("uc_delta_mirror", "t").await.unwrap_err();
    assert!(matches!(err, CatalogError::AuthError(_)), "got {err:?}");
}

#[tokio::test]
async fn test_get_table_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(target("GetTable"))
        .respond_with(json_response(
            500,
            serde_json::json!({
                "__type": "InternalServiceException",
                "Message": "boom"
            }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let glue = glue_for(&server);
    assert!(glue.get_table("uc_delta_mirror", "t").await.is_err());
}

// ---- registrar over glue ----

#[tokio::test]
async fn test_register_creates_when_absent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(target("GetTable"))
        .respond_with(entity_not_found())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(target("CreateTable"))
        .and(body_partial_json(serde_json::json!({
            "DatabaseName": "uc_delta_mirror",
            "TableInput": {
                "Name": "analytics_prod__events",
                "TableType": "EXTERNAL_TABLE",
                "Parameters": { "classification": "delta" },
                "StorageDescriptor": {
                    "Columns": [
                        { "Name": "id", "Type": "bigint" },
                        { "Name": "name", "Type": "string" }
                    ],
                    "Location": "s3://bucket/events",
                    "InputFormat": "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat",
                    "OutputFormat": "org.apache.hadoop.hive.ql.io.parquet.MapredParquetOutputFormat",
                    "SerdeInfo": {
                        "SerializationLibrary": "org.apache.hadoop.hive.ql.io.parquet.serde.ParquetHiveSerDe"
                    },
                    "StoredAsSubDirectories": false
                }
            }
        })))
        .respond_with(json_response(200, serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(target("UpdateTable"))
        .respond_with(json_response(200, serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let registrar = Registrar::new(
        Arc::new(glue_for(&server)),
        "uc_delta_mirror",
        DataSourceFormat::Delta,
    );
    let registration = registrar
        .register(
            "analytics_prod.events",
            "s3://bucket/events",
            &[
                SourceColumn::new("id", "LongType"),
                SourceColumn::new("name", "StringType"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(registration.target_name, "analytics_prod__events");
    assert_eq!(registration.outcome, RegistrationOutcome::Created);
}

#[tokio::test]
async fn test_register_updates_when_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(target("GetTable"))
        .respond_with(json_response(
            200,
            serde_json::json!({
                "Table": { "Name": "analytics_prod__events", "DatabaseName": "uc_delta_mirror" }
            }),
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(target("UpdateTable"))
        .and(body_partial_json(serde_json::json!({
            "DatabaseName": "uc_delta_mirror",
            "TableInput": { "Name": "analytics_prod__events" }
        })))
        .respond_with(json_response(200, serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(target("CreateTable"))
        .respond_with(json_response(200, serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let registrar = Registrar::new(
        Arc::new(glue_for(&server)),
        "uc_delta_mirror",
        DataSourceFormat::Delta,
    );
    let registration = registrar
        .register("analytics_prod.events", "s3://bucket/events", &[])
        .await
        .unwrap();
    assert_eq!(registration.outcome, RegistrationOutcome::Updated);
}

#[tokio::test]
async fn test_register_create_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(target("GetTable"))
        .respond_with(entity_not_found())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(target("CreateTable"))
        .respond_with(json_response(
            400,
            serde_json::json!({
                "__type": "InvalidInputException",
                "Message": "bad location"
            }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let registrar = Registrar::new(
        Arc::new(glue_for(&server)),
        "uc_delta_mirror",
        DataSourceFormat::Delta,
    );
    let err = registrar
        .register("analytics_prod.events", "not-a-uri", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidDefinition(_)), "got {err:?}");
}
