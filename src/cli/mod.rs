pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden CLI - Command-line interface for the workforce supervision API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        default_value = "http://localhost:3000",
        help = "API server base URL (or set WARDEN_SERVER)"
    )]
    pub server: String,

    #[arg(
        long,
        global = true,
        help = "Bearer token for protected endpoints (or set WARDEN_TOKEN)"
    )]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Check server health")]
    Health,

    #[command(about = "Show the authenticated caller")]
    Whoami,

    #[command(about = "Atomically reassign a batch of employees to a supervisor")]
    Reassign {
        #[arg(
            long = "user",
            required = true,
            help = "Target employee email (repeat for a batch)"
        )]
        users: Vec<String>,

        #[arg(long, help = "New supervisor email; omit to unassign")]
        supervisor: Option<String>,
    },

    #[command(about = "Mint a local JWT for ops and testing")]
    Token {
        #[arg(long, help = "Identity-provider subject of the caller")]
        external_id: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "EMPLOYEE", help = "Role claim (informational)")]
        role: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Server base URL: flag wins, then WARDEN_SERVER.
    pub fn server_url(&self) -> String {
        if self.server != "http://localhost:3000" {
            return self.server.trim_end_matches('/').to_string();
        }
        std::env::var("WARDEN_SERVER")
            .unwrap_or_else(|_| self.server.clone())
            .trim_end_matches('/')
            .to_string()
    }

    /// Bearer token: flag wins, then WARDEN_TOKEN.
    pub fn bearer_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("WARDEN_TOKEN").ok())
    }
}
