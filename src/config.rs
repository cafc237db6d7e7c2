use crate::session::Role;
use clap::Parser;
use std::path::PathBuf;

/// Startup options. Every flag can also come from the environment so a host
/// app can configure the sidecar without building a command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "gradebookd", version, about = "Grade aggregation and grading workflow sidecar")]
pub struct Config {
    /// Roster snapshot (`{"students": [...]}`) to load at startup.
    #[arg(long, env = "GRADEBOOKD_ROSTER")]
    pub roster: Option<PathBuf>,

    /// Initial session role.
    #[arg(long, env = "GRADEBOOKD_ROLE", value_enum, default_value_t = Role::Student)]
    pub role: Role,

    /// Log filter directive; `RUST_LOG` takes precedence when set.
    #[arg(long, env = "GRADEBOOKD_LOG", default_value = "gradebookd=info")]
    pub log_filter: String,
}
