//! HTTP client for the Server Guard gateway

use crate::endpoints::Endpoints;
use crate::error::GatewayError;
use crate::models::{AnalyzeRequest, AnalyzeResponse, DashboardSnapshot, Node, NodeRegistry};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote operations the console depends on
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Submit a synthetic attack (or probe) for analysis
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, GatewayError>;

    /// Fetch the latest dashboard snapshot
    async fn dashboard(&self) -> Result<DashboardSnapshot, GatewayError>;

    /// List registered fleet nodes
    async fn nodes(&self) -> Result<Vec<Node>, GatewayError>;

    /// Human-readable location of the analysis endpoint, for log lines
    fn analyze_location(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// reqwest-backed gateway client
pub struct HttpGateway {
    client: Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    /// Create a new client with the default timeout
    pub fn new(endpoints: Endpoints) -> Result<Self, GatewayError> {
        Self::with_timeout(endpoints, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoints: Endpoints, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("server-guard-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get<T: DeserializeOwned>(&self, url: &Url) -> Result<T, GatewayError> {
        debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        decode(response).await
    }
}

/// Map non-success statuses to errors, preferring the `{error}` envelope
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            return Err(GatewayError::Upstream(envelope.error));
        }
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, GatewayError> {
        let url = &self.endpoints.attack;
        debug!(url = %url, attack_type = %request.attack_type, "POST");

        let response = self.client.post(url.clone()).json(request).send().await?;
        let verdict: AnalyzeResponse = decode(response).await?;

        match verdict.error {
            Some(error) if !verdict.is_blocked() => Err(GatewayError::Upstream(error)),
            _ => Ok(verdict),
        }
    }

    async fn dashboard(&self) -> Result<DashboardSnapshot, GatewayError> {
        self.get(&self.endpoints.dashboard).await
    }

    async fn nodes(&self) -> Result<Vec<Node>, GatewayError> {
        let registry: NodeRegistry = self.get(&self.endpoints.nodes).await?;
        Ok(registry.nodes.into_iter().map(Node::from).collect())
    }

    fn analyze_location(&self) -> String {
        self.endpoints.attack.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::EndpointConfig;
    use crate::models::NodeStatus;

    fn gateway_for(server: &mockito::ServerGuard) -> HttpGateway {
        let endpoints = EndpointConfig {
            gateway_url: Some(server.url()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        HttpGateway::new(endpoints).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_blocked_verdict() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"blocked","threat_level":"critical","web_ai_score":0.97}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let verdict = gateway.analyze(&AnalyzeRequest::probe()).await.unwrap();

        mock.assert_async().await;
        assert!(verdict.is_blocked());
        assert_eq!(verdict.web_ai_score, Some(0.97));
    }

    #[tokio::test]
    async fn test_analyze_error_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/analyze")
            .with_status(500)
            .with_body(r#"{"error":"model not loaded"}"#)
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let err = gateway.analyze(&AnalyzeRequest::probe()).await.unwrap_err();

        assert!(matches!(err, GatewayError::Upstream(ref msg) if msg == "model not loaded"));
    }

    #[tokio::test]
    async fn test_analyze_plain_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/analyze")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let err = gateway.analyze(&AnalyzeRequest::probe()).await.unwrap_err();

        assert!(matches!(err, GatewayError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_dashboard_snapshot() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/dashboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"logs":[{"id":1,"service":"web_frontend","status":"blocked","score":0.9}],"total_logs":12}"#,
            )
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let snapshot = gateway.dashboard().await.unwrap();

        assert_eq!(snapshot.logs.len(), 1);
        assert_eq!(snapshot.total_logs, Some(12));
    }

    #[tokio::test]
    async fn test_nodes_listing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/nodes")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"nodes":[{"node_id":"n1","ip":"10.0.0.2","port":9000,"sector":"urban","status":"online"}],"sectors":{}}"#,
            )
            .create_async()
            .await;

        let gateway = gateway_for(&server);
        let nodes = gateway.nodes().await.unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].address, "10.0.0.2:9000");
        assert_eq!(nodes[0].status, NodeStatus::Online);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let endpoints = EndpointConfig {
            gateway_url: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        let gateway = HttpGateway::with_timeout(endpoints, Duration::from_secs(2)).unwrap();

        let err = gateway.dashboard().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
