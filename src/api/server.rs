use crate::api::routes;
use crate::config::SharedConfig;
use crate::provider::SharedRegistry;
use std::future::Future;
use std::net::SocketAddr;

/// Everything an update request needs, immutable once the server runs.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: SharedConfig,
    pub registry: SharedRegistry,
}

pub fn new(
    config: SharedConfig,
    registry: SharedRegistry,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&config.api_bind_addr).serve(
        routes::new(AppState { config, registry })
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
}
