use cloudbench_core::prelude::ShutdownHandle;
use tokio::signal;

/// Turn Ctrl-C into a shutdown signal for the run.
pub(crate) fn start_shutdown_listener(runtime: &tokio::runtime::Runtime) -> ShutdownHandle {
    let handle = ShutdownHandle::default();

    let listener_handle = handle.clone();
    runtime.spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C, the run cannot be interrupted: {e:?}");
            return;
        }
        log::warn!("Received shutdown signal, shutting down...");
        listener_handle.shutdown();
    });

    handle
}
