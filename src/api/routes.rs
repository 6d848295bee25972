use crate::api::auth;
use crate::api::server::AppState;
use crate::client_ip::Resolver;
use crate::gate::Gate;
use crate::record::normalize_name;
use crate::reply::{self, ReturnCode};
use crate::update;
use axum::extract::{ConnectInfo, RawQuery, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use tokio::time;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Query parameters of an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateParams {
    pub hostname: Option<String>,
    pub myip: Option<String>,
}

impl UpdateParams {
    /// Read the parameters from a raw query string. A repeated parameter keeps its first value,
    /// an undecodable query yields no parameters at all.
    pub fn from_query(query: Option<&str>) -> Self {
        let decoded = query.map(serde_urlencoded::from_str::<Vec<(String, String)>>);
        let pairs = match decoded {
            Some(Ok(pairs)) => pairs,
            Some(Err(err)) => {
                tracing::debug!("ignoring undecodable query string: {err}");
                vec![]
            }
            None => vec![],
        };
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.clone())
        };
        UpdateParams {
            hostname: first("hostname"),
            myip: first("myip"),
        }
    }
}

pub(super) fn new(state: AppState) -> Router {
    // Update requests enforce their own deadline so they can still answer with a body.
    Router::new()
        .route("/healthcheck", get(health_check))
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .route("/nic/update", get(update))
        .route("/update", get(update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn update(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> String {
    let params = UpdateParams::from_query(query.as_deref());
    let hosts = params
        .hostname
        .as_deref()
        .map(parse_hostnames)
        .unwrap_or_default();

    let deadline = state.config.api_timeout;
    match time::timeout(deadline, handle_update(&state, client_addr, params, &headers)).await {
        Ok(body) => body,
        Err(_) => {
            tracing::error!("update from {client_addr} timed out after {deadline:?}");
            let codes = vec![ReturnCode::DnsError; hosts.len().max(1)];
            reply::respond(None, &hosts, &codes)
        }
    }
}

/// Split the `hostname` parameter, keeping one entry per comma separated item.
pub fn parse_hostnames(hostname: &str) -> Vec<String> {
    hostname.split(',').map(normalize_name).collect()
}

/// Answer an update request from `client_addr`. The body always goes out with status 200, failures
/// are reported through the return codes.
pub async fn handle_update(
    state: &AppState,
    client_addr: SocketAddr,
    params: UpdateParams,
    headers: &HeaderMap,
) -> String {
    let config = &state.config;

    if !auth::authorize(&config.users, headers) {
        return reply::respond(None, &[], &[ReturnCode::BadAuth]);
    }

    let hosts = match params.hostname.as_deref().map(str::trim) {
        Some(hostname) if !hostname.is_empty() => parse_hostnames(hostname),
        // If no hostnames were specified, notfqdn is returned once.
        _ => return reply::respond(None, &[], &[ReturnCode::NotFqdn]),
    };

    let resolver = Resolver::new(&config.trusted_remotes, config.no_local_ip);
    let ip = match resolver
        .resolve(client_addr.ip(), headers, params.myip.as_deref())
        .await
    {
        Ok(ip) => ip,
        Err(err) => {
            tracing::error!("could not determine ip for {client_addr}: {err}");
            return reply::respond(None, &hosts, &vec![ReturnCode::DnsError; hosts.len()]);
        }
    };

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    tracing::info!(%ip, ?hosts, user_agent, "ddns update request");

    let gate = Gate::new(config.max_concurrency);
    let codes = update::update(&state.registry, &gate, &hosts, ip).await;
    reply::respond(Some(ip), &hosts, &codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Error;
    use crate::provider::{Capability, DynProvider, Provider, Registry, REQUIRED_CAPABILITIES};
    use crate::record::Record;
    use crate::record_store::{DynRecordStore, InMemoryRecordStore};
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    const CONFIG: &str = r#"{
        "api_bind_addr": "127.0.0.1:8245",
        "api_timeout": 1,
        "users": { "router": "hunter2" },
        "providers": [ { "name": "local", "zones": ["dyn.example.com"] } ]
    }"#;

    // router:hunter2
    const CREDENTIALS: &str = "Basic cm91dGVyOmh1bnRlcjI=";

    struct Stalled;

    #[async_trait::async_trait]
    impl Provider for Stalled {
        fn name(&self) -> String {
            "stalled".to_string()
        }

        fn capabilities(&self) -> Vec<Capability> {
            REQUIRED_CAPABILITIES.to_vec()
        }

        async fn list_zones(&self) -> Result<Vec<String>, Error> {
            Ok(vec!["dyn.example.com".to_string()])
        }

        async fn set_records(&self, _zone: &str, records: &[Record]) -> Result<Vec<Record>, Error> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(records.to_vec())
        }
    }

    fn app(providers: Option<Vec<DynProvider>>) -> Router {
        let config: Config = serde_json::from_str(CONFIG).unwrap();
        let record_store: DynRecordStore = Arc::new(RwLock::new(InMemoryRecordStore::default()));
        let registry = match providers {
            Some(providers) => Registry::new(providers).unwrap(),
            None => Registry::from_config(&config.providers, &record_store).unwrap(),
        };
        let state = AppState {
            config: Arc::new(config),
            registry: Arc::new(registry),
        };
        new(state).layer(MockConnectInfo(SocketAddr::from(([203, 0, 113, 9], 4000))))
    }

    async fn send(app: Router, uri: &str, authorized: bool) -> (StatusCode, String, String) {
        let mut request = Request::builder().uri(uri);
        if authorized {
            request = request.header(AUTHORIZATION, CREDENTIALS);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (
            status,
            content_type,
            String::from_utf8(body.to_vec()).unwrap(),
        )
    }

    #[test]
    fn hostnames_split_on_commas() {
        assert_eq!(
            parse_hostnames("a.example.com, B.Example.org.,,c.example.net"),
            vec!["a.example.com", "b.example.org", "", "c.example.net"]
        );
        assert_eq!(parse_hostnames("a.example.com"), vec!["a.example.com"]);
    }

    #[test]
    fn query_keeps_first_value() {
        assert_eq!(
            UpdateParams::from_query(Some(
                "hostname=a.example.com%2Cb.example.com&myip=192.0.2.1&hostname=c.example.com"
            )),
            UpdateParams {
                hostname: Some("a.example.com,b.example.com".to_string()),
                myip: Some("192.0.2.1".to_string()),
            }
        );
        assert_eq!(UpdateParams::from_query(None), UpdateParams::default());
        assert_eq!(
            UpdateParams::from_query(Some("hostname&myip=")),
            UpdateParams {
                hostname: Some(String::new()),
                myip: Some(String::new()),
            }
        );
    }

    #[tokio::test]
    async fn both_endpoints_answer_with_plain_text() {
        let (status, content_type, body) =
            send(app(None), "/nic/update?hostname=a.dyn.example.com", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/plain"), "{content_type}");
        assert_eq!(body, "good 203.0.113.9");

        let (status, _, body) = send(
            app(None),
            "/update?hostname=a.dyn.example.com,b.example.org",
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "good 203.0.113.9\nnohost");
    }

    #[tokio::test]
    async fn repeated_hostname_uses_the_first() {
        let (status, _, body) = send(
            app(None),
            "/nic/update?hostname=a.dyn.example.com&hostname=b.example.org",
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "good 203.0.113.9");
    }

    #[tokio::test]
    async fn request_failures_still_answer_ok() {
        let (status, _, body) = send(app(None), "/nic/update", true).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "notfqdn"));

        let (status, _, body) = send(app(None), "/nic/update?hostname&myip=", true).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "notfqdn"));

        let (status, _, body) =
            send(app(None), "/nic/update?hostname=a.dyn.example.com", false).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "badauth"));
    }

    #[tokio::test]
    async fn timed_out_update_reports_dnserr() {
        let app = app(Some(vec![Arc::new(Stalled) as DynProvider]));
        let (status, _, body) = send(
            app,
            "/nic/update?hostname=a.dyn.example.com,b.dyn.example.com",
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "dnserr\ndnserr");
    }
}
