//! Client commands: `list`, `describe` and `call`.

use crate::cli::Target;
use crate::ui;
use beacon_kernel::config::load_config;
use beacon_kernel::{BeaconClient, KernelError};
use beacon_types::{Endpoint, InvocationError, QualifiedName};
use serde_json::Value;
use std::path::Path;

pub fn cmd_list(config: Option<&Path>, target: &Target) {
    let client = connect(config, target);
    super::block_on(async {
        let objects = client
            .channel()
            .list()
            .await
            .unwrap_or_else(|e| report_call_error(&client, &e));
        if objects.is_empty() {
            ui::hint("no objects published");
            return;
        }
        ui::section(&format!("{} object(s) at {}", objects.len(), client.endpoint()));
        for object in objects {
            println!("{:<40} {}", object.name.to_string(), object.interface);
        }
    });
}

pub fn cmd_describe(config: Option<&Path>, target: &Target, name: &str) {
    let name = parse_name(name);
    let client = connect(config, target);
    super::block_on(async {
        let interface = client
            .channel()
            .describe(&name)
            .await
            .unwrap_or_else(|e| report_call_error(&client, &e));
        ui::section(&name.to_string());
        ui::kv("Interface", &interface.full_name());
        ui::blank();
        for method in &interface.methods {
            println!("  {method}");
        }
    });
}

pub fn cmd_call(config: Option<&Path>, target: &Target, name: &str, method: &str, args: &[String]) {
    let name = parse_name(name);
    let client = connect(config, target);
    let args: Vec<Value> = args.iter().map(String::as_str).map(parse_arg).collect();
    super::block_on(async {
        let interface = client
            .channel()
            .describe(&name)
            .await
            .unwrap_or_else(|e| report_call_error(&client, &e));
        let handle = client.handle(interface, name);
        let value = handle
            .call(method, args)
            .await
            .unwrap_or_else(|e| report_call_error(&client, &e));
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(_) => println!("{value}"),
        }
    });
}

/// The `[client]` endpoint with command-line overrides applied.
pub fn client_endpoint(mut endpoint: Endpoint, target: &Target) -> Endpoint {
    if let Some(host) = &target.host {
        endpoint.host = host.clone();
    }
    if let Some(port) = target.port {
        endpoint.port = port;
    }
    if let Some(path) = &target.path {
        endpoint.path = path.clone();
    }
    endpoint
}

/// Command-line argument as a JSON value; plain words become strings.
pub fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_name(raw: &str) -> QualifiedName {
    raw.parse()
        .unwrap_or_else(|e| ui::fail(&format!("Invalid object name '{raw}': {e}")))
}

fn connect(config: Option<&Path>, target: &Target) -> BeaconClient {
    let endpoint = client_endpoint(load_config(config).client, target);
    match BeaconClient::new(endpoint) {
        Ok(client) => client,
        Err(KernelError::RemoteClientDisabled) => {
            ui::error_with_fix(
                "No remote directory configured",
                "pass --port <PORT> or set `port` in the [client] table of the config file",
            );
            std::process::exit(1);
        }
        Err(e) => ui::fail(&e.to_string()),
    }
}

fn report_call_error(client: &BeaconClient, e: &InvocationError) -> ! {
    if e.is_transient() {
        ui::error_with_fix(
            &format!("Cannot reach {}: {}", client.endpoint(), e.message()),
            "check that `beacon serve` is running on that port",
        );
        std::process::exit(1);
    }
    ui::fail(&e.to_string())
}
