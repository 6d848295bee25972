use crate::config::DnsConfig;
use crate::error::Error;
use crate::record::{normalize_name, relative_name};
use crate::record_store::DynRecordStore;
use lazy_static::lazy_static;
use std::net::IpAddr;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::error;
use trust_dns_proto::rr::rdata::SOA;
use trust_dns_server::authority::MessageResponseBuilder;
use trust_dns_server::client::op::{Header, MessageType, OpCode, ResponseCode};
use trust_dns_server::client::rr::{Name, RData, Record, RecordType};
use trust_dns_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

/// TTL of the SOA answer, address answers carry the TTL they were stored with.
const SOA_TTL: u32 = 3_600;

#[derive(Clone)]
pub struct Handler {
    config: DnsConfig,
    zones: Vec<String>,
    record_store: DynRecordStore,
}

lazy_static! {
    static ref SERIAL_FORMATTER: &'static [time::format_description::FormatItem<'static>] =
        format_description!(version = 2, "[year][month][day]");
}

impl Handler {
    pub(super) fn new(config: DnsConfig, zones: Vec<String>, record_store: DynRecordStore) -> Self {
        Handler {
            config,
            zones,
            record_store,
        }
    }

    /// The served zone containing `name`, and `name` relative to it. Most specific zone first.
    fn zone_for(&self, name: &Name) -> Option<(&str, String)> {
        let fqdn = normalize_name(&name.to_string());
        self.zones
            .iter()
            .filter(|zone| fqdn == **zone || fqdn.ends_with(&format!(".{zone}")))
            .max_by_key(|zone| zone.len())
            .map(|zone| (zone.as_str(), relative_name(&fqdn, zone)))
    }

    async fn dispatch_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response: R,
    ) -> Result<ResponseInfo, Error> {
        // If it isn't a query, return NOTIMPL.
        if request.op_code() != OpCode::Query || request.message_type() != MessageType::Query {
            return self.handle_notimpl(request, response).await;
        }

        // Otherwise handle by query type, or return NOTIMPL.
        match request.query().query_type() {
            RecordType::A => {
                self.handle_request_address(request, response, RecordType::A)
                    .await
            }
            RecordType::AAAA => {
                self.handle_request_address(request, response, RecordType::AAAA)
                    .await
            }
            RecordType::SOA => self.handle_request_soa(request, response).await,
            _ => self.handle_notimpl(request, response).await,
        }
    }

    async fn handle_notimpl<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let response = MessageResponseBuilder::from_message_request(request);
        Ok(response_handle
            .send_response(response.error_msg(request.header(), ResponseCode::NotImp))
            .await?)
    }

    async fn handle_request_address<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
        record_type: RecordType,
    ) -> Result<ResponseInfo, Error> {
        let query_name: Name = request.query().name().into();
        let Some((zone, name)) = self.zone_for(&query_name) else {
            return self.send_nxdomain(request, response_handle).await;
        };

        let records: Vec<Record> = self
            .record_store
            .read()
            .await
            .lookup(zone, &name, record_type)
            .await
            .iter()
            .filter_map(|record| {
                let rdata = match record.ip {
                    IpAddr::V4(v4) => RData::A(v4),
                    IpAddr::V6(v6) => RData::AAAA(v6),
                };
                let ttl = u32::try_from(record.ttl.as_secs()).unwrap_or(u32::MAX);
                (record.record_type() == record_type)
                    .then(|| Record::from_rdata(query_name.clone(), ttl, rdata))
            })
            .collect();

        if records.is_empty() {
            return self.send_nxdomain(request, response_handle).await;
        }
        self.send_auth_resp(request, response_handle, records).await
    }

    async fn handle_request_soa<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let query_name: Name = request.query().name().into();
        match self.zone_for(&query_name) {
            Some((_, apex)) if apex == "@" => {}
            _ => return self.send_nxdomain(request, response_handle).await,
        }

        // NB: unwraps are safe: known date format producing values that will always parse as u32.
        let serial: u32 = OffsetDateTime::now_utc()
            .format(&SERIAL_FORMATTER)
            .unwrap()
            .parse()
            .unwrap();
        let ns_admin = self.config.ns_admin()?;
        // See RIPE 203[0] for recommended values.
        // [0]: https://www.ripe.net/publications/docs/ripe-203
        let soa_rdata = RData::SOA(SOA::new(
            self.config.ns_domain.clone().into(),
            ns_admin,
            serial,
            86_400,    // 24 hrs.
            7_200,     // 2 hours.
            3_600_000, // 1000 hours.
            172_800,   // 2 days.
        ));
        let records = vec![Record::from_rdata(query_name, SOA_TTL, soa_rdata)];
        self.send_auth_resp(request, response_handle, records).await
    }

    async fn send_auth_resp<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
        records: Vec<Record>,
    ) -> Result<ResponseInfo, Error> {
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(header, records.iter(), &[], &[], &[]);
        Ok(response_handle.send_response(response).await?)
    }

    async fn send_nxdomain<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> Result<ResponseInfo, Error> {
        let builder = MessageResponseBuilder::from_message_request(request);
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        header.set_response_code(ResponseCode::NXDomain);
        let response = builder.build_no_records(header);
        Ok(response_handle.send_response(response).await?)
    }
}

#[async_trait::async_trait]
impl RequestHandler for Handler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        match self.dispatch_request(request, response_handle).await {
            Ok(info) => info,
            Err(error) => {
                error!("error in RequestHandler: {:?}", error);
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::InMemoryRecordStore;
    use std::str::FromStr;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn handler() -> Handler {
        let config: DnsConfig = serde_json::from_str(
            r#"{
                "udp_bind_addr": "127.0.0.1:5353",
                "tcp_bind_addr": "127.0.0.1:5353",
                "tcp_timeout": 5,
                "ns_domain": "ns1.example.com.",
                "ns_admin": "admin@example.com"
            }"#,
        )
        .unwrap();
        Handler::new(
            config,
            vec!["example.com".to_string(), "dyn.example.com".to_string()],
            Arc::new(RwLock::new(InMemoryRecordStore::default())),
        )
    }

    #[test]
    fn most_specific_zone_is_served() {
        let handler = handler();
        let name = Name::from_str("Home.Dyn.Example.com.").unwrap();
        assert_eq!(
            handler.zone_for(&name),
            Some(("dyn.example.com", "home".to_string()))
        );

        let apex = Name::from_str("example.com.").unwrap();
        assert_eq!(handler.zone_for(&apex), Some(("example.com", "@".to_string())));

        let foreign = Name::from_str("example.org.").unwrap();
        assert_eq!(handler.zone_for(&foreign), None);
    }
}
