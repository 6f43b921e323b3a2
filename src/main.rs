mod auth;
mod backup;
mod config;
mod db;
mod ipc;
mod logging;
mod store;

use std::io::{self, BufRead, Write};

use tracing::{info, warn};

fn main() {
    let config = config::Config::from_env();
    logging::init(&config.log_filter);

    let mut state = ipc::AppState::new(config);
    if !state.auth.is_configured() {
        warn!("{} is not set; backup requests will be rejected", config::ENV_ADMIN_TOKEN);
    }
    if let Some(path) = state.config.workspace.clone() {
        if let Err(e) = ipc::select_workspace(&mut state, path.clone()) {
            warn!(workspace = %path.to_string_lossy(), error = %format!("{e:#}"), "startup workspace not opened");
        }
    }
    info!(version = env!("CARGO_PKG_VERSION"), "coursed ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                warn!(error = %e, "unparseable request line");
                let _ = writeln!(stdout, "{}", ipc::bad_json(e.to_string()));
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
