//! Integration tests for the Fitbit provider and the sync engine
//!
//! These tests use wiremock to mock API responses with recorded fixtures.

use chrono::NaiveDate;
use sleeplog_cli::client::{FitbitClient, FitbitProvider, FitbitToken, OAuthApp, SleepProvider};
use sleeplog_cli::storage::TableStore;
use sleeplog_cli::sync::SyncEngine;
use sleeplog_cli::SleepLogError;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RANGE_FIXTURE: &str = include_str!("fixtures/sleep_range_2024-01-01_2024-01-03.json");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Create a test token
fn test_token() -> FitbitToken {
    FitbitToken::new("test-access-token", "test-refresh-token", 3600).with_scope("sleep")
}

/// Create a provider that points to the mock server
fn test_provider(mock_server: &MockServer) -> FitbitProvider {
    let client = FitbitClient::new_with_base_url(&mock_server.uri()).unwrap();
    FitbitProvider::new(client, test_token())
}

mod provider_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_sleep_range() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.2/user/-/sleep/date/2024-01-01/2024-01-03.json"))
            .and(header("Authorization", "Bearer test-access-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RANGE_FIXTURE))
            .mount(&mock_server)
            .await;

        let logs = test_provider(&mock_server)
            .sleep_logs(date(2024, 1, 1), date(2024, 1, 3))
            .await
            .expect("Failed to get sleep logs");

        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0]["dateOfSleep"], "2024-01-03");
        assert_eq!(logs[0]["levels"]["summary"]["deep"]["minutes"], 60);
    }

    #[tokio::test]
    async fn test_long_range_is_split_into_windows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.2/user/-/sleep/date/2024-01-01/2024-04-09.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RANGE_FIXTURE))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/1.2/user/-/sleep/date/2024-04-10/2024-05-01.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "sleep": [] })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let logs = test_provider(&mock_server)
            .sleep_logs(date(2024, 1, 1), date(2024, 5, 1))
            .await
            .unwrap();

        assert_eq!(logs.len(), 3);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let err = test_provider(&mock_server)
            .sleep_logs(date(2024, 1, 1), date(2024, 1, 3))
            .await
            .unwrap_err();

        assert!(matches!(err, SleepLogError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let err = test_provider(&mock_server)
            .sleep_logs(date(2024, 1, 1), date(2024, 1, 3))
            .await
            .unwrap_err();

        assert!(matches!(err, SleepLogError::RateLimited));
    }

    #[tokio::test]
    async fn test_server_error_is_provider_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&mock_server)
            .await;

        let err = test_provider(&mock_server)
            .sleep_logs(date(2024, 1, 1), date(2024, 1, 3))
            .await
            .unwrap_err();

        match err {
            SleepLogError::ProviderUnavailable(msg) => assert!(msg.contains("maintenance")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

mod token_tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_token_grant() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=test-refresh-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(include_str!("fixtures/token_refresh.json")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = FitbitClient::new_with_base_url(&mock_server.uri()).unwrap();
        let app = OAuthApp {
            client_id: "23ABCD".to_string(),
            client_secret: "secret".to_string(),
        };

        let token = client.refresh_token(&app, &test_token()).await.unwrap();

        assert_eq!(token.access_token, "fresh-access-token");
        assert_eq!(token.refresh_token, "fresh-refresh-token");
        assert!(token.has_scope("sleep"));
        assert!(!token.is_expired());
    }
}

mod sync_tests {
    use super::*;

    #[tokio::test]
    async fn test_backfill_then_noop() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.2/user/-/sleep/date/2024-01-01/2024-01-03.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RANGE_FIXTURE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let store = TableStore::new(temp.path().join("sleep.csv"));
        let engine = SyncEngine::new(test_provider(&mock_server), store.clone(), date(2024, 1, 1));

        let first = engine.run(date(2024, 1, 3)).await.unwrap();
        assert_eq!(first.table.len(), 3);
        for record in &first.table {
            assert_eq!(record.duration, 220);
            assert_eq!(record.efficiency, Some(0.95));
        }

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let dates: Vec<&str> = contents
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);

        let second = engine.run(date(2024, 1, 3)).await.unwrap();
        assert_eq!(second.table, first.table);
        assert!(!second.stats.persisted);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), contents);
    }

    #[tokio::test]
    async fn test_double_delivery_is_merge_conflict() {
        let mock_server = MockServer::start().await;

        // Answers the gap request with nights that are already stored
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RANGE_FIXTURE))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let store = TableStore::new(temp.path().join("sleep.csv"));
        let engine = SyncEngine::new(test_provider(&mock_server), store.clone(), date(2024, 1, 1));

        engine.run(date(2024, 1, 3)).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let err = engine.run(date(2024, 1, 5)).await.unwrap_err();

        assert!(matches!(err, SleepLogError::MergeConflict { .. }));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_no_table() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let store = TableStore::new(temp.path().join("sleep.csv"));
        let engine = SyncEngine::new(test_provider(&mock_server), store.clone(), date(2024, 1, 1));

        let err = engine.run(date(2024, 1, 3)).await.unwrap_err();

        assert!(err.is_provider_error());
        assert!(!store.path().exists());
    }
}
