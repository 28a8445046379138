//! fluxradar agent: wires configuration, collector and delivery into the cycle loop.

#![forbid(unsafe_code)]

pub mod config;
pub mod scheduler;
pub mod telemetry;

use std::future::Future;

use radar_collect::{BatchBuilder, Collector};
use radar_core::Registry;
use radar_deliver::DeliveryClient;
use radar_kubehub::ObjectStore;
use tracing::{info, warn};

pub use config::{Cli, Settings};
pub use scheduler::Scheduler;

/// Assemble the pipeline described by `settings` on top of `store`.
pub fn build_scheduler<S: ObjectStore>(settings: &Settings, store: S) -> Scheduler<S, DeliveryClient> {
    let registry = Registry::default_catalog(settings.include_native);
    info!(
        kinds = registry.len(),
        namespaces = ?settings.namespaces,
        endpoint = %settings.controller_url,
        trust = ?settings.trust,
        interval_secs = settings.interval.as_secs_f64(),
        "pipeline configured"
    );
    Scheduler::new(
        Collector::new(store, registry, settings.namespaces.clone()),
        BatchBuilder::new(settings.cluster_name.clone()),
        DeliveryClient::new(settings.controller_url.clone(), settings.trust),
        settings.interval,
    )
}

/// Resolves on Ctrl-C or SIGTERM. Handlers are installed when this is called, not on first poll,
/// so a signal arriving during the first cycle is still held for the loop.
#[cfg(unix)]
pub fn shutdown_signal() -> impl Future<Output = ()> + Send {
    use tokio::signal::unix::{signal, SignalKind};
    let term = signal(SignalKind::terminate());
    let interrupt = signal(SignalKind::interrupt());
    async move {
        match (term, interrupt) {
            (Ok(mut term), Ok(mut interrupt)) => tokio::select! {
                _ = interrupt.recv() => info!("Ctrl-C received"),
                _ = term.recv() => info!("SIGTERM received"),
            },
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "cannot install signal handlers; running until killed");
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
pub fn shutdown_signal() -> impl Future<Output = ()> + Send {
    async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
