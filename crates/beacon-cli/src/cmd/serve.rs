//! `beacon serve`: publish the demo objects and expose them remotely.

use crate::demo::{CounterImpl, HelloImpl};
use crate::ui;
use beacon_kernel::config::load_config;
use beacon_kernel::{BeaconModule, Bindings, KernelError, Manager};
use beacon_types::{BeaconConfig, BeaconError};
use beacon_wire::{ConnectorError, StartOutcome};
use std::path::Path;
use tracing::info;

/// Domain the demo objects are published in.
pub const DEMO_DOMAIN: &str = "demo";

pub fn cmd_serve(
    config: Option<&Path>,
    port: Option<i32>,
    path: Option<String>,
    host: Option<String>,
) {
    let config = server_config(load_config(config), port, path, host);
    if !config.server.is_enabled() {
        ui::error_with_fix(
            "Remote access is disabled",
            "pass --port <PORT> or set `port` in the [server] table of the config file",
        );
        std::process::exit(1);
    }

    let module = match demo_module(config) {
        Ok(module) => module,
        Err(e) => ui::fail(&format!("Invalid registration: {e}")),
    };
    let bindings = Bindings::new();
    bindings.bind(HelloImpl).bind(CounterImpl::default());

    super::block_on(async {
        let manager = match Manager::manage(&module, &bindings).await {
            Ok(manager) => manager,
            Err(e) => report_bootstrap_error(&e),
        };

        ui::section("Beacon directory");
        if let Some(StartOutcome::Listening(addr)) = manager.outcome() {
            ui::kv("Address", &addr.to_string());
        }
        ui::kv("Path", &module.server_endpoint().path);
        for name in manager.published() {
            ui::success(&name.to_string());
        }
        ui::hint("press Ctrl+C to stop");

        if let Err(e) = tokio::signal::ctrl_c().await {
            ui::error(&format!("Failed to listen for Ctrl+C: {e}"));
        }
        info!("Shutting down");
        manager.shutdown().await;
    });
}

/// Apply command-line overrides to the `[server]` table.
pub fn server_config(
    mut config: BeaconConfig,
    port: Option<i32>,
    path: Option<String>,
    host: Option<String>,
) -> BeaconConfig {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(path) = path {
        config.server.path = path;
    }
    if let Some(host) = host {
        config.server.host = host;
    }
    config
}

/// Module registering the demo `Hello` and `Counter` objects.
pub fn demo_module(config: BeaconConfig) -> Result<BeaconModule, BeaconError> {
    let mut module = BeaconModule::from_config(config);
    module
        .register::<HelloImpl>()?
        .to_domain(DEMO_DOMAIN)
        .as_type("Hello");
    module
        .register::<CounterImpl>()?
        .to_domain(DEMO_DOMAIN)
        .as_type("Counter");
    Ok(module)
}

fn report_bootstrap_error(e: &KernelError) -> ! {
    match e {
        KernelError::Connector(ConnectorError::EndpointBind { address, .. }) => {
            ui::error_with_fix(
                &format!("Could not listen on {address}"),
                "choose another port with --port, or stop the process using it",
            );
            std::process::exit(1);
        }
        other => ui::fail(&format!("Bootstrap failed: {other}")),
    }
}
