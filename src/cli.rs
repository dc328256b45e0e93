use clap::{ArgAction, Parser};
use std::path::PathBuf;
use unback_config::Overrides;

/// Rebuild the directory tree of a local, unencrypted iOS backup.
#[derive(Debug, Parser)]
#[command(name = "unback", version, about)]
pub struct Args {
    /// Backup directory (the one containing Manifest.db)
    #[arg(short = 's', long = "src", value_name = "DIR")]
    pub source: Option<PathBuf>,
    /// Where to rebuild the tree [default: _unback_]
    #[arg(short = 'd', long = "dst", value_name = "DIR")]
    pub destination: Option<PathBuf>,
    /// More output (-v for setup details, -vv for every record)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    /// Print device information from Info.plist and exit
    #[arg(short, long)]
    pub info: bool,
    /// Only extract records of this domain (e.g. "AppDomain-com.example.app")
    #[arg(long, value_name = "DOMAIN")]
    pub domain: Option<String>,
    /// Resolve every record without writing anything
    #[arg(long)]
    pub dry_run: bool,
    /// Exit with an error if any record was skipped
    #[arg(long)]
    pub strict: bool,
    /// Config file [default: config.toml in the user config directory]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Flags that override the configuration file and environment. Switches
    /// that were not given leave those layers alone.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            destination: self.destination.clone(),
            dry_run: self.dry_run.then_some(true),
            strict: self.strict.then_some(true),
        }
    }

    /// Default log filter for the verbosity counter; `RUST_LOG` wins over it.
    pub fn log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        // sqlx logs every statement.
        format!("{level},sqlx=warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_command() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from(["unback", "-s", "/backups/abc", "-d", "/tmp/out", "-vv", "-i"]).unwrap();
        assert_eq!(args.source.as_deref(), Some(std::path::Path::new("/backups/abc")));
        assert_eq!(args.destination.as_deref(), Some(std::path::Path::new("/tmp/out")));
        assert_eq!(args.verbose, 2);
        assert!(args.info);
    }

    #[rstest]
    #[case(&[], "info,sqlx=warn")]
    #[case(&["-v"], "debug,sqlx=warn")]
    #[case(&["-vv"], "trace,sqlx=warn")]
    #[case(&["-vvvv"], "trace,sqlx=warn")]
    fn test_log_filter(#[case] flags: &[&str], #[case] expected: &str) {
        let args = Args::try_parse_from(["unback"].iter().chain(flags)).unwrap();
        assert_eq!(args.log_filter(), expected);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from(["unback", "--src", "/backups/abc", "--strict"]).unwrap();
        let overrides = args.overrides();
        assert_eq!(overrides.source.as_deref(), Some(std::path::Path::new("/backups/abc")));
        assert_eq!(overrides.destination, None);
        assert_eq!(overrides.dry_run, None);
        assert_eq!(overrides.strict, Some(true));
    }
}
