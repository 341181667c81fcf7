use clap::Parser;
use log::error;

use lectorium_web::cli::{self, Cli, Commands};
use lectorium_web::config::Config;
use lectorium_web::server;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Commands::Serve) | None => actix_web::rt::System::new()
            .block_on(server::run(Config::new()))
            .map_err(anyhow::Error::from),
        Some(Commands::ParseTasks { file, markers, compact }) => {
            cli::handle_parse_tasks(&file, markers.as_deref(), compact)
        }
        Some(Commands::Outline { file }) => cli::handle_outline(&file),
        Some(Commands::Lectures) => actix_web::rt::System::new().block_on(cli::handle_lectures()),
        Some(Commands::FixBackticks { path, dry_run }) => cli::handle_fix_backticks(&path, dry_run),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
