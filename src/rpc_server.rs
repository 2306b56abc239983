//! HairNova RPC Server: JSON-RPC over stdin/stdout for the web shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"history.add", "params":{"styleId":"...", ...}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr; stdout carries protocol lines only.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use serde_json::{json, Value};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use hairnova::app::App;
use hairnova::platform;
use hairnova::rpc_handler::handle_method;

fn send(out: &mut impl Write, line: &Value) -> io::Result<()> {
    writeln!(out, "{}", line)?;
    out.flush()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let data_dir = platform::get_data_dir();
    let settings_path = std::env::var("HAIRNOVA_SETTINGS").ok();
    let app = match App::new(settings_path, &data_dir) {
        Ok(mut app) => {
            app.startup();
            Mutex::new(app)
        }
        Err(e) => {
            error!("Failed to initialize HairNova: {}", e);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if send(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")})).is_err() {
        return;
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));
                match handle_method(&app, method, &params) {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => {
                        warn!(method, "RPC call failed: {}", err);
                        json!({"id": id, "error": err})
                    }
                }
            }
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
        };

        if send(&mut out, &response).is_err() {
            break;
        }
    }

    let guard = app.lock();
    if let Ok(mut app) = guard {
        app.shutdown();
    }
}
