use crate::error::Error;
use crate::gate::Gate;
use crate::provider::Registry;
use crate::record::{absolute_name, Record};
use crate::reply::ReturnCode;
use crate::update::router::ChangeList;
use tracing::{debug, error};

/// One `set_records` call: a provider, a zone and the records written there, plus the outcome.
#[derive(Debug)]
pub struct Job {
    pub provider_idx: usize,
    pub provider: String,
    pub zone: String,
    pub records: Vec<Record>,
    pub outcome: Result<Vec<Record>, Error>,
}

/// Run one job per (provider, zone) in `changes`, at most `gate.size()` at a time, and wait for
/// all of them.
///
/// Jobs are independent: a failing provider doesn't stop or delay the others. Each job is a
/// detached task, so dropping this future doesn't cancel provider calls already in flight.
pub async fn dispatch(registry: &Registry, gate: &Gate, changes: ChangeList) -> Vec<Job> {
    let mut pending = vec![];

    for (provider_idx, zones) in changes {
        let Some(provider) = registry.get(provider_idx) else {
            error!(provider_idx, "no provider for routed records");
            continue;
        };
        for (zone, records) in zones {
            let permit = gate.acquire().await;
            let task_provider = provider.clone();
            let (task_zone, task_records) = (zone.clone(), records.clone());
            let handle = tokio::spawn(async move {
                let _permit = permit;
                task_provider.set_records(&task_zone, &task_records).await
            });
            pending.push((provider_idx, provider.name(), zone, records, handle));
        }
    }

    gate.wait_all().await;

    let mut jobs = Vec::with_capacity(pending.len());
    for (provider_idx, provider, zone, records, handle) in pending {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(err) => Err(Error::JobFailed(err.to_string())),
        };
        jobs.push(Job {
            provider_idx,
            provider,
            zone,
            records,
            outcome,
        });
    }
    jobs
}

/// Fold job outcomes into `codes`, which is aligned with `hosts`.
///
/// * A failed zone marks its hostnames [`ReturnCode::DnsError`].
/// * A zone that wrote at least one record marks its hostnames [`ReturnCode::Good`].
/// * A zone that wrote nothing leaves its hostnames as they are.
///
/// Hostnames already marked [`ReturnCode::NoHost`] are never touched. Every hostname is routed to
/// exactly one zone, so the order of `jobs` doesn't matter.
pub fn aggregate(jobs: &[Job], hosts: &[String], codes: &mut [ReturnCode]) {
    for job in jobs {
        let code = match &job.outcome {
            Err(err) => {
                error!(
                    provider = %job.provider,
                    provider_idx = job.provider_idx,
                    zone = %job.zone,
                    "setting records failed: {err}"
                );
                ReturnCode::DnsError
            }
            Ok(written) if !written.is_empty() => ReturnCode::Good,
            Ok(_) => continue,
        };
        set_codes_for_records(codes, &job.records, code, &job.zone, hosts);
    }
}

fn set_codes_for_records(
    codes: &mut [ReturnCode],
    records: &[Record],
    value: ReturnCode,
    zone: &str,
    hosts: &[String],
) {
    for record in records {
        let hostname = absolute_name(&record.name, zone);
        let mut matched = false;
        for (host, code) in hosts.iter().zip(codes.iter_mut()) {
            if *host == hostname && *code != ReturnCode::NoHost {
                *code = value;
                matched = true;
            }
        }
        if !matched {
            debug!("dropping result for {hostname}, not a requested hostname");
        }
    }
}
