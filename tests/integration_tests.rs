//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: ISS endpoint → HTTP request → XML payload → JSON/Arrow/Parquet output

use chrono::NaiveDate;
use moex_iss::client::{CandlesQuery, Endpoint, IssClient, SecuritiesQuery};
use moex_iss::config::ClientConfig;
use moex_iss::decode::Cell;
use moex_iss::output::{to_record_batch, write_table_to_parquet};
use moex_iss::types::{BackoffType, OutputMode, ParquetCompression};
use moex_iss::Error;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECURITIES: &str = include_str!("fixtures/securities.xml");
const SECURITY: &str = include_str!("fixtures/security.xml");
const CANDLES: &str = include_str!("fixtures/candles.xml");

fn config_for(server: &MockServer, mode: OutputMode) -> ClientConfig {
    ClientConfig {
        base_url: format!("{}/iss", server.uri()),
        output_mode: mode,
        max_retries: 1,
        backoff: BackoffType::Constant,
        initial_backoff_ms: 10,
        max_backoff_ms: 10,
        rate_limit: None,
        ..ClientConfig::default()
    }
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/xml; charset=utf-8")
        .set_body_string(body)
}

// ============================================================================
// Endpoint Round Trips
// ============================================================================

#[tokio::test]
async fn test_securities_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/securities.xml"))
        .and(query_param("q", "SBER"))
        .and(query_param("limit", "3"))
        .and(query_param("start", "0"))
        .respond_with(xml(SECURITIES))
        .expect(1)
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::RecordJson)).unwrap();
    let rendered = client
        .securities(SecuritiesQuery::search("SBER").with_limit(3))
        .await
        .unwrap();

    let records: Value = serde_json::from_str(rendered.as_json().unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 3);
    assert_eq!(
        records[0],
        json!({
            "id": 2707,
            "secid": "SBER",
            "shortname": "Сбербанк",
            "regnumber": "10301481B",
            "name": "Сбербанк России ПАО ао",
            "isin": "RU0009029540",
            "is_traded": 1,
            "emitent_id": 1199,
            "primary_boardid": "TQBR"
        })
    );
    assert_eq!(records[2]["emitent_id"], Value::Null);
    assert_eq!(records[2]["isin"], "");
}

#[tokio::test]
async fn test_securities_tabular() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/securities.xml"))
        .respond_with(xml(SECURITIES))
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::Tabular)).unwrap();
    let table = client
        .securities(SecuritiesQuery::default())
        .await
        .unwrap()
        .into_table()
        .unwrap();

    assert_eq!(table.num_rows(), 3);
    assert_eq!(
        table.column_names(),
        vec![
            "id",
            "secid",
            "shortname",
            "regnumber",
            "name",
            "isin",
            "is_traded",
            "emitent_id",
            "primary_boardid"
        ]
    );
    assert_eq!(table.value(1, "secid"), Some(&Cell::Text("SBERP".into())));
    assert_eq!(table.value(2, "emitent_id"), Some(&Cell::Null));
}

#[tokio::test]
async fn test_security_is_pivoted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/securities/IMOEX.xml"))
        .and(query_param("start", "0"))
        .respond_with(xml(SECURITY))
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::RecordJson)).unwrap();
    let rendered = client.security("IMOEX").await.unwrap();

    assert_eq!(
        rendered.as_json(),
        Some(
            r#"[{"secid":"IMOEX","name":"Индекс МосБиржи","shortname":"Индекс МосБиржи","froguaranteeddate":"1997-09-22"}]"#
        )
    );
}

#[tokio::test]
async fn test_candles_parameters_and_types() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/iss/engines/stock/markets/shares/securities/SBER/candles.xml",
        ))
        .and(query_param("from", "2024-01-10"))
        .and(query_param("till", "2024-01-10"))
        .and(query_param("interval", "60"))
        .respond_with(xml(CANDLES))
        .expect(1)
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::Tabular)).unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let query = CandlesQuery::new("stock", "shares", "SBER")
        .between(day, day)
        .with_interval(60);

    let table = client.candles(query).await.unwrap().into_table().unwrap();
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.value(0, "open"), Some(&Cell::Double(271.5)));
    assert_eq!(
        table.value(0, "begin").and_then(Cell::as_datetime),
        day.and_hms_opt(10, 0, 0)
    );

    let batch = to_record_batch(&table).unwrap();
    assert_eq!(batch.num_columns(), 8);
    assert_eq!(batch.num_rows(), 2);
}

#[tokio::test]
async fn test_other_endpoint_passes_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/turnovers.xml"))
        .and(query_param("lang", "en"))
        .respond_with(xml(SECURITIES))
        .expect(1)
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::RecordJson)).unwrap();
    let rendered = client
        .other_endpoint("turnovers", vec![("lang".to_string(), "en".to_string())])
        .await
        .unwrap();
    assert!(rendered.as_json().unwrap().starts_with(r#"[{"id":2707"#));
}

#[tokio::test]
async fn test_configured_language() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/engines/stock/markets.xml"))
        .and(query_param("lang", "en"))
        .respond_with(xml(SECURITIES))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        lang: Some("en".to_string()),
        ..config_for(&server, OutputMode::Tabular)
    };
    let client = IssClient::from_config(&config).unwrap();
    client.markets("stock").await.unwrap();
}

// ============================================================================
// Error Handling
// ============================================================================

#[tokio::test]
async fn test_not_found_is_reported_with_truncated_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/securities/NOPE.xml"))
        .respond_with(ResponseTemplate::new(404).set_body_string("n".repeat(500)))
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::RecordJson)).unwrap();
    match client.security("NOPE").await.unwrap_err() {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body.len(), 100);
        }
        other => panic!("expected HttpStatus, got {other}"),
    }
}

#[tokio::test]
async fn test_server_error_retried_then_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/engines.xml"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/iss/engines.xml"))
        .respond_with(xml(SECURITIES))
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::Tabular)).unwrap();
    let table = client.engines().await.unwrap().into_table().unwrap();
    assert_eq!(table.num_rows(), 3);
}

#[tokio::test]
async fn test_html_error_page_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/sitenews.xml"))
        .respond_with(xml("<html><body><h1>Service unavailable</h1></body></html>"))
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::RecordJson)).unwrap();
    let err = client.sitenews(0).await.unwrap_err();
    assert!(matches!(err, Error::MalformedPayload { .. }), "got {err}");
}

#[tokio::test]
async fn test_pivot_on_wrong_payload_is_shape_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/iss/securities/SBER.xml"))
        .respond_with(xml(CANDLES))
        .mount(&server)
        .await;

    let client = IssClient::from_config(&config_for(&server, OutputMode::RecordJson)).unwrap();
    let err = client.request(&Endpoint::security("SBER")).await.unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch { .. }), "got {err}");
}

#[test]
fn test_invalid_base_url_rejected() {
    let config = ClientConfig::default().with_base_url("iss.moex.com");
    let err = IssClient::from_config(&config).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

// ============================================================================
// Offline Decoding
// ============================================================================

#[test]
fn test_decode_fixture_block_to_parquet() {
    let config = moex_iss::PipelineConfig::new(
        moex_iss::TransformMode::Default,
        OutputMode::Tabular,
    )
    .with_block("boards");
    let table = moex_iss::process(SECURITY, &config)
        .unwrap()
        .into_table()
        .unwrap();
    assert_eq!(table.column_names(), vec!["secid", "boardid", "is_primary"]);

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("boards.parquet");
    let rows = write_table_to_parquet(&file, &table, ParquetCompression::Zstd).unwrap();
    assert_eq!(rows, 1);
    assert!(file.exists());
}
