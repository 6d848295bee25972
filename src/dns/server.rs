use crate::config::DnsConfig;
use crate::dns::handlers::Handler;
use crate::record_store::DynRecordStore;
use tokio::net::{TcpListener, UdpSocket};
use trust_dns_server::ServerFuture;

/// Bind the configured UDP and TCP listeners, answering for `zones` from `record_store`.
///
/// # Errors
///
/// Returns an error if either listener can't be bound.
pub async fn new(
    config: DnsConfig,
    zones: Vec<String>,
    record_store: DynRecordStore,
) -> anyhow::Result<ServerFuture<Handler>> {
    let udp_addr = config.udp_bind_addr;
    let tcp_addr = config.tcp_bind_addr;
    let tcp_timeout = config.tcp_timeout;
    let dns_handler = Handler::new(config, zones, record_store);
    let mut dns_server = ServerFuture::new(dns_handler);
    dns_server.register_socket(UdpSocket::bind(udp_addr).await?);
    dns_server.register_listener(TcpListener::bind(tcp_addr).await?, tcp_timeout);
    Ok(dns_server)
}
