//! Sea Browser bridge server: the JS bridge over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "handler":"sea", "action":"addBookmark", "url":"...", "title":"..."}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Instant;

use seabrowser::app::App;
use seabrowser::bridge::handle_message;
use seabrowser::config::{init_logging, AppConfig};

use serde_json::{json, Value};

const MAX_REQUESTS_PER_SECOND: u32 = 200;

/// Fixed one-second window request limiter.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn write_line(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

fn main() {
    init_logging();

    let config = AppConfig::from_env();
    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Sea Browser");
            std::process::exit(1);
        }
    };
    let initial_url = app.startup();
    let app = Mutex::new(app);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION"), "url": initial_url});
    if write_line(&mut out, &ready).is_err() {
        return;
    }

    let mut rate_limiter = RateLimiter::new(MAX_REQUESTS_PER_SECOND);

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
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                if !rate_limiter.check() {
                    json!({"id": id, "error": "rate limit exceeded"})
                } else {
                    let handler = req.get("handler").and_then(Value::as_str).unwrap_or("sea");
                    match handle_message(&app, handler, &req) {
                        Ok(val) => json!({"id": id, "result": val}),
                        Err(err) => json!({"id": id, "error": err}),
                    }
                }
            }
        };

        if write_line(&mut out, &response).is_err() {
            break;
        }
    }

    match app.into_inner() {
        Ok(mut app) => app.shutdown(),
        Err(e) => tracing::error!(error = %e, "App state poisoned, settings not saved"),
    }
}
