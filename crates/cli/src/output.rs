use chrono::SecondsFormat;
use ferrous_dnsmasq_domain::config::OutputFormat;
use ferrous_dnsmasq_domain::{Lease, Query};
use std::io::Write;

pub fn format_query(query: &Query, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(query)?),
        OutputFormat::Text => {
            let source = if query.was_cached() {
                "cache".to_string()
            } else {
                query.queried.join(",")
            };
            let elapsed = query
                .response_time_ms()
                .map(|ms| format!(" {}ms", ms))
                .unwrap_or_default();
            Ok(format!(
                "{} {} {} via {} -> {}{}",
                query.started.to_rfc3339_opts(SecondsFormat::Millis, true),
                query.made_by,
                query.domain,
                source,
                query.result.join(","),
                elapsed
            ))
        }
    }
}

pub fn format_leases(leases: &[Lease], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(leases)?),
        OutputFormat::Text => Ok(leases
            .iter()
            .map(|lease| {
                let expires = lease
                    .expires
                    .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .unwrap_or_else(|| "never".to_string());
                format!(
                    "lease {} {} {} expires {}",
                    lease.ip_address, lease.mac_address, lease.hostname, expires
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub fn emit(line: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()
}
