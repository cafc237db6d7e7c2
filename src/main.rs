mod calc;
mod chart;
mod config;
mod error;
mod import;
mod ipc;
mod model;
mod roster;
mod session;
mod workflow;

use clap::Parser;
use serde_json::json;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn init_logging(cfg: &config::Config) {
    // stdout carries the protocol, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn initial_state(cfg: &config::Config) -> ipc::AppState {
    // Best-effort: a bad startup roster must not keep the sidecar from serving.
    let roster = match cfg.roster.as_ref() {
        None => model::Roster::default(),
        Some(path) => match roster::read_roster_file(path) {
            Ok(r) => {
                tracing::info!(
                    path = %path.to_string_lossy(),
                    student_count = r.len(),
                    "startup roster loaded"
                );
                r
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.to_string_lossy(),
                    code = e.code(),
                    error = %e,
                    "startup roster not loaded"
                );
                model::Roster::default()
            }
        },
    };
    ipc::AppState {
        session: session::RoleSession::new(cfg.role),
        store: workflow::GradingWorkflowStore::new(roster),
    }
}

fn main() -> anyhow::Result<()> {
    let cfg = config::Config::parse();
    init_logging(&cfg);
    tracing::info!(role = cfg.role.as_str(), "gradebookd starting");

    let mut state = initial_state(&cfg);

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
                tracing::warn!(error = %e, "bad request line");
                let reply = json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                writeln!(stdout, "{}", reply)?;
                stdout.flush()?;
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        writeln!(stdout, "{}", resp)?;
        stdout.flush()?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
