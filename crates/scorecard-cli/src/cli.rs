use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use scorecard::SectionKind;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Base URL of the live source.
    #[arg(long, env = "COMPANY_URL", default_value = "https://www.screener.in", global = true)]
    pub(crate) company_url: String,

    /// SQLite database for stored records. Records live in memory when unset.
    #[arg(long, env = "SCORECARD_DB", global = true)]
    pub(crate) db: Option<PathBuf>,

    /// Never fetch from the live source.
    #[arg(long, global = true)]
    pub(crate) offline: bool,

    /// Minimum relevance for using a stored record.
    #[arg(long, default_value_t = scorecard::DEFAULT_THRESHOLD, global = true)]
    pub(crate) threshold: f64,

    /// Base log level.
    #[arg(long, env = "SCORECARD_LOG", default_value = "info", global = true)]
    pub(crate) log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub(crate) log_format: LogFormat,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Resolve and score every holding in the given CSV sheets.
    Run {
        /// Holdings sheets, one CSV file each.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Resolve one instrument and print its scores and a statement section.
    Show {
        /// Instrument name as it appears in a sheet.
        name: String,

        /// Section to print.
        #[arg(long, value_enum, default_value_t = SectionArg::QuarterlyResults)]
        section: SectionArg,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SectionArg {
    /// Quarterly results.
    QuarterlyResults,
    /// Annual profit and loss.
    ProfitLoss,
    /// Annual balance sheet.
    BalanceSheet,
    /// Annual cash flows.
    CashFlows,
    /// Efficiency ratios.
    Ratios,
}

impl From<SectionArg> for SectionKind {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::QuarterlyResults => Self::QuarterlyResults,
            SectionArg::ProfitLoss => Self::ProfitLoss,
            SectionArg::BalanceSheet => Self::BalanceSheet,
            SectionArg::CashFlows => Self::CashFlows,
            SectionArg::Ratios => Self::Ratios,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::try_parse_from(["scorecard", "run", "a.csv", "b.csv", "--offline"]).unwrap();
        assert!(cli.offline);
        assert_eq!(cli.log_format, LogFormat::Pretty);
        match cli.command {
            Commands::Run { files } => assert_eq!(files, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]),
            Commands::Show { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_requires_files() {
        assert!(Cli::try_parse_from(["scorecard", "run"]).is_err());
    }

    #[test]
    fn test_show_command() {
        let cli = Cli::try_parse_from([
            "scorecard",
            "--log-format",
            "json",
            "show",
            "Infosys Limited",
            "--section",
            "profit-loss",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::Show { name, section } => {
                assert_eq!(name, "Infosys Limited");
                assert_eq!(SectionKind::from(section), SectionKind::ProfitLoss);
            }
            Commands::Run { .. } => panic!("expected show"),
        }
    }
}
