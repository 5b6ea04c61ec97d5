use flow_core::prelude::ShutdownHandle;
use tokio::signal;

/// Trigger the returned [ShutdownHandle] when the process receives Ctrl-C.
pub(crate) fn start_shutdown_listener(runtime: &tokio::runtime::Runtime) -> ShutdownHandle {
    let handle = ShutdownHandle::default();

    let listener_handle = handle.clone();
    runtime.spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Received shutdown signal, shutting down...");
                listener_handle.shutdown();
            }
            Err(e) => {
                log::error!("Failed to listen for Ctrl-C, the exporter must be stopped externally: {e}");
            }
        }
    });

    handle
}
