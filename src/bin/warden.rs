use clap::Parser;

use warden_api::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env so the token command sees JWT_SECRET without extra flags.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let output_format = cli.output_format();
    let server = cli.server_url();
    let token = cli.bearer_token();

    match cli.command {
        Commands::Health => commands::health::handle(&server, output_format).await,
        Commands::Whoami => commands::whoami::handle(&server, token, output_format).await,
        Commands::Reassign { users, supervisor } => {
            commands::reassign::handle(&server, token, users, supervisor, output_format).await
        }
        Commands::Token {
            external_id,
            email,
            name,
            role,
        } => commands::token::handle(external_id, email, name, role, output_format).await,
    }
}
