//! Shared fixtures for infra integration tests
//!
//! A temporary SQLite file, a wiremock-backed API, and JSON builders for the
//! remote record shapes.

#![allow(dead_code)]

use std::sync::Arc;

use fieldsync_domain::{
    ApiConfig, Config, DatabaseConfig, LoggingConfig, RetryConfig, SyncConfig,
};
use fieldsync_infra::{StaticTokenProvider, SyncContext};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_PREFIX: &str = "/api";
pub const TEST_TOKEN: &str = "integration-token";

/// Engine wired against a mock API and a temporary database file.
pub struct TestEngine {
    pub server: MockServer,
    pub ctx: SyncContext,
    _temp_dir: TempDir,
}

impl TestEngine {
    /// Start a mock server and build the context with no throttle.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let config = test_config(&server, &temp_dir);

        let ctx = SyncContext::new(config, Arc::new(StaticTokenProvider::new(TEST_TOKEN)))
            .expect("sync context should be created");

        Self { server, ctx, _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .ctx
            .db
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }

    pub fn query_string(&self, sql: &str) -> String {
        let conn = self.ctx.db.get_connection().expect("connection should be available");
        conn.query_row(sql, [], |row| row.get(0)).expect("query should return one row")
    }

    /// Serve one page of a collection at the offset matching `page_number`.
    pub async fn mount_page(&self, resource: &str, page_number: u32, items: Vec<Value>, total: u64) {
        let offset = u64::from(page_number - 1) * u64::from(PAGE_SIZE);
        Mock::given(method("GET"))
            .and(path(format!("{API_PREFIX}{resource}")))
            .and(query_param("offset", offset.to_string()))
            .and(query_param("limit", PAGE_SIZE.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"items": items, "total": total, "offset": offset, "limit": PAGE_SIZE}
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve one page of a server that caps every page at `served_limit`
    /// records, whatever limit was requested.
    pub async fn mount_capped_page(
        &self,
        resource: &str,
        page_number: u32,
        served_limit: u32,
        items: Vec<Value>,
        total: u64,
    ) {
        let offset = u64::from(page_number - 1) * u64::from(served_limit);
        Mock::given(method("GET"))
            .and(path(format!("{API_PREFIX}{resource}")))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"items": items, "total": total, "offset": offset, "limit": served_limit}
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer every request to `resource` with `status`.
    pub async fn mount_status(&self, resource: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("{API_PREFIX}{resource}")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer one page request of `resource` with `status`.
    pub async fn mount_page_status(&self, resource: &str, page_number: u32, status: u16) {
        let offset = u64::from(page_number - 1) * u64::from(PAGE_SIZE);
        Mock::given(method("GET"))
            .and(path(format!("{API_PREFIX}{resource}")))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_documents(&self, customer_id: &str, documents: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(format!("{API_PREFIX}/kycDocuments")))
            .and(query_param("customerId", customer_id))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": {"documents": documents}})),
            )
            .mount(&self.server)
            .await;
    }

    /// Offsets requested for `resource`, in order.
    pub async fn requested_offsets(&self, resource: &str) -> Vec<String> {
        let wanted = format!("{API_PREFIX}{resource}");
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == wanted)
            .filter_map(|request| {
                request
                    .url
                    .query_pairs()
                    .find(|(key, _)| key == "offset")
                    .map(|(_, value)| value.into_owned())
            })
            .collect()
    }
}

pub const PAGE_SIZE: u32 = 25;

pub fn test_config(server: &MockServer, temp_dir: &TempDir) -> Config {
    Config {
        api: ApiConfig { base_url: format!("{}{API_PREFIX}", server.uri()), timeout_secs: 5 },
        database: DatabaseConfig {
            path: temp_dir.path().join("fieldsync.db").to_string_lossy().into_owned(),
            pool_size: 2,
        },
        sync: SyncConfig { page_size: PAGE_SIZE, throttle_window_secs: 0 },
        retry: RetryConfig { max_attempts: 1, initial_backoff_ms: 1, max_backoff_ms: 1 },
        logging: LoggingConfig::default(),
    }
}

pub fn lead(id: &str) -> Value {
    json!({
        "id": id,
        "customerName": format!("Customer of {id}"),
        "phone": "+91 98450 12345",
        "address": "21 Residency Road, Bengaluru",
        "status": "new",
        "services": ["rooftop-solar"],
        "assignedTo": "agent-3",
        "createdAt": "2024-05-01T08:00:00Z",
        "updatedAt": "2024-05-02T08:00:00Z"
    })
}

/// Leads `lead-{from}` through `lead-{to}` inclusive.
pub fn leads(from: usize, to: usize) -> Vec<Value> {
    (from..=to).map(|n| lead(&format!("lead-{n}"))).collect()
}

pub fn customer(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Customer {id}"),
        "phone": "+91 98450 54321",
        "leadId": "lead-1",
        "createdAt": "2024-05-03T08:00:00Z",
        "updatedAt": "2024-05-03T09:00:00Z"
    })
}

pub fn document(id: &str, customer_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "customerId": customer_id,
        "documentType": "pan_card",
        "status": status
    })
}

pub fn quotation(id: &str) -> Value {
    json!({
        "id": id,
        "leadId": "lead-1",
        "customerName": "Customer of lead-1",
        "totalAmount": "185000.00",
        "status": "sent",
        "createdAt": "2024-05-04T08:00:00Z"
    })
}
