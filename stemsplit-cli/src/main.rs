//! Stemsplit CLI
//!
//! Command-line interface for the stem separation server.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "stemsplit")]
#[command(about = "Split audio into stems with a Stemsplit server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "STEMSPLIT_URL", default_value = "http://localhost:8080")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process() {
        let cli = Cli::try_parse_from([
            "stemsplit",
            "--server-url",
            "http://stems:9000",
            "process",
            "https://cdn.example.com/song.mp3",
            "--stems",
            "vocals,instrumental",
            "--id",
            "job_1",
        ])
        .unwrap();

        assert_eq!(cli.server_url, "http://stems:9000");
        match cli.command {
            Commands::Process(args) => {
                assert_eq!(args.source_url, "https://cdn.example.com/song.mp3");
                assert_eq!(args.stems, vec!["vocals", "instrumental"]);
                assert_eq!(args.id.as_deref(), Some("job_1"));
                assert_eq!(args.interval_ms, 1000);
                assert!(!args.no_wait);
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_process_requires_stems() {
        assert!(Cli::try_parse_from(["stemsplit", "process", "https://x/a.mp3"]).is_err());
    }

    #[test]
    fn test_parse_status_and_delete() {
        let cli = Cli::try_parse_from(["stemsplit", "status", "job_1"]).unwrap();
        assert!(matches!(cli.command, Commands::Status { id } if id == "job_1"));

        let cli =
            Cli::try_parse_from(["stemsplit", "delete", "http://localhost:8080/files/uploads/a.mp3"])
                .unwrap();
        assert!(matches!(cli.command, Commands::Delete { .. }));
    }

    #[test]
    fn test_parse_files() {
        let cli = Cli::try_parse_from(["stemsplit", "files"]).unwrap();
        assert!(matches!(cli.command, Commands::Files { prefix: None }));

        let cli = Cli::try_parse_from(["stemsplit", "files", "--prefix", "uploads"]).unwrap();
        assert!(matches!(cli.command, Commands::Files { prefix: Some(p) } if p == "uploads"));
    }
}
