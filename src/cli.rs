use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vanillaops",
    version,
    about = "Vanilla greenhouse climate policy dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory (saved language, log file)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Display language (en, pt)
    #[arg(long)]
    pub lang: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify the latest feed snapshot
    Status {
        /// greenhouse or outdoor
        #[arg(short, long, default_value = "greenhouse")]
        location: String,
        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the active growth-phase policy
    Policy {
        /// Month number (1-12) instead of the current month
        #[arg(short, long)]
        month: Option<u32>,
    },
    /// Render a 24-hour chart as SVG
    Chart {
        /// temperature, humidity, vpd, illuminance, moisture, conductivity
        #[arg(short, long)]
        metric: String,
        /// Restrict climate charts to greenhouse or outdoor
        #[arg(short, long)]
        location: Option<String>,
        /// Restrict probe charts to first or second
        #[arg(short, long)]
        probe: Option<String>,
        /// Write the SVG here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print historical rows for a date range
    Table {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// greenhouse, outdoor or both
        #[arg(short, long, default_value = "greenhouse")]
        location: String,
    },
    /// Validate config and test the feed
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_table_dates() {
        let cli = Cli::parse_from([
            "vanillaops",
            "--lang",
            "pt",
            "table",
            "--from",
            "2025-06-01",
            "--to",
            "2025-06-02",
            "-l",
            "both",
        ]);
        assert_eq!(cli.lang.as_deref(), Some("pt"));
        match cli.command {
            Some(Commands::Table { from, to, location }) => {
                assert_eq!(from, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
                assert_eq!(to, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
                assert_eq!(location, "both");
            }
            _ => panic!("expected table command"),
        }
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::parse_from(["vanillaops", "-vv"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }
}
