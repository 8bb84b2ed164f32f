use anyhow::Result;
use wraith_client::{locator, paths, WraithClient};

pub fn show(client: &WraithClient) -> Result<()> {
    let endpoint = client.endpoint();
    let consent = if client.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };
    let presence = if endpoint.exists() {
        "present"
    } else {
        "absent"
    };
    println!("Telemetry: {}", consent);
    println!("Endpoint: {} ({})", endpoint.display(), presence);
    println!("Installation ID: {}", client.installation_id());
    println!("Tool version: {}", client.tool_version());
    println!("Auto-spawn: {}", client.auto_spawn());

    match locator::locate(&paths::home_dir()) {
        Some(path) => println!("Collector: {}", path.display()),
        None => println!("Collector: not found"),
    }

    if client.is_enabled() {
        let reachable = if client.ensure_connected() {
            "ok"
        } else {
            "unavailable"
        };
        println!("Connection: {}", reachable);
    }
    Ok(())
}
