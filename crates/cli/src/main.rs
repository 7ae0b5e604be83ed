use clap::Parser;
use ferrous_dnsmasq_application::use_cases::SyncLeasesUseCase;
use ferrous_dnsmasq_domain::config::OutputFormat;
use ferrous_dnsmasq_domain::CliOverrides;
use ferrous_dnsmasq_infrastructure::dnsmasq::DnsmasqLogWatcher;
use ferrous_dnsmasq_infrastructure::system::LeaseFileReader;
use ferrous_dnsmasq_jobs::{JobRunner, LeaseWatchJob};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

mod bootstrap;
mod output;

#[derive(Parser)]
#[command(name = "ferrous-dnsmasq")]
#[command(version)]
#[command(about = "Ferrous dnsmasq - DNS query stream and DHCP leases from dnsmasq logs")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Named pipe dnsmasq logs to
    #[arg(short = 'p', long, value_name = "FIFO")]
    pipe: Option<String>,

    /// dnsmasq lease file
    #[arg(short = 'l', long, value_name = "FILE")]
    leases: Option<String>,

    /// Window after a query line within which its answers are collected
    #[arg(long)]
    query_timeout_ms: Option<u64>,

    /// Raw log lines buffered before the oldest is dropped
    #[arg(long)]
    buffer_capacity: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output format (json, text)
    #[arg(short = 'f', long)]
    format: Option<OutputFormat>,

    /// Log every raw dnsmasq line at trace level
    #[arg(long)]
    trace_lines: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        pipe_path: cli.pipe.clone(),
        query_timeout_ms: cli.query_timeout_ms,
        buffer_capacity: cli.buffer_capacity,
        leases_path: cli.leases.clone(),
        log_level: cli.log_level.clone(),
        output_format: cli.format,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);
    bootstrap::config::log_config(cli.config.as_deref(), &config);

    info!("Starting Ferrous dnsmasq v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();
    let format = config.output.format;

    let (query_tx, mut query_rx) = mpsc::channel(config.log_watch.event_capacity);
    let (error_tx, mut error_rx) = mpsc::channel(64);

    let mut watcher = DnsmasqLogWatcher::new(&config.log_watch).with_error_reporter(error_tx);
    if cli.trace_lines {
        watcher = watcher.with_observer(Arc::new(|line: &str, dns_related: bool| {
            trace!(dns_related, line, "dnsmasq log line");
        }));
    }
    let watch = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { watcher.watch(shutdown, query_tx).await })
    };

    let (lease_tx, mut lease_rx) = mpsc::channel(4);
    let mut jobs = JobRunner::new().with_shutdown_token(shutdown.clone());
    if config.leases.enabled {
        let lease_reader = Arc::new(LeaseFileReader::with_path(config.leases.path.clone()));
        let sync_leases = Arc::new(SyncLeasesUseCase::new(lease_reader));
        jobs = jobs.with_lease_watch(
            LeaseWatchJob::new(sync_leases, lease_tx)
                .with_interval(Duration::from_secs(config.leases.poll_interval_secs)),
        );
    } else {
        drop(lease_tx);
    }
    let job_handles = jobs.start().await;

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            info!("Shutdown signal received, draining in-flight queries");
            shutdown.cancel();
        });
    }

    loop {
        tokio::select! {
            query = query_rx.recv() => match query {
                Some(query) => output::emit(&output::format_query(&query, format)?)?,
                None => break,
            },
            Some(leases) = lease_rx.recv() => {
                output::emit(&output::format_leases(&leases, format)?)?;
            }
            Some(err) = error_rx.recv() => {
                debug!(error = %err, "dnsmasq log line rejected");
            }
        }
    }

    // the query stream also ends when the watcher fails; stop the jobs too
    shutdown.cancel();
    for handle in job_handles {
        if let Err(e) = handle.await {
            error!(error = %e, "Background job panicked");
        }
    }

    watch.await??;

    info!("Shutdown complete");
    Ok(())
}
