mod cli;
mod error;

use clap::Parser;
use exn::ResultExt;
use futures::StreamExt;
use std::path::Path;
use std::pin::pin;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use unback_config::Config;
use unback_device::DeviceInfo;
use unback_engine::{Action, ExtractEvent, Resolver, Summary, extract};
use unback_manifest::{Database, Repository};
use unback_storage::BackendHandle;
use unback_storage::backend::{LocalBackend, ReadOnlyBackend};

use crate::cli::Args;
use crate::error::{ErrorKind, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = Config::load(args.config.as_deref(), &args.overrides()).or_raise(|| ErrorKind::Config)?;
    if args.info {
        print_info(&config)?;
        return Ok(ExitCode::SUCCESS);
    }

    let summary = run_extraction(&config, args.domain.as_deref()).await?;
    if config.strict && summary.skipped > 0 {
        tracing::error!(skipped = summary.skipped, "records were skipped in strict mode");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_info(config: &Config) -> Result<()> {
    let path = config.info_path().or_raise(|| ErrorKind::Config)?;
    tracing::debug!(path = %path.display(), "reading device information");
    let info = DeviceInfo::from_path(&path).or_raise(|| ErrorKind::Info)?;
    print!("{info}");
    Ok(())
}

async fn run_extraction(config: &Config, domain: Option<&str>) -> Result<Summary> {
    let source = config.source().or_raise(|| ErrorKind::Config)?;
    let manifest = config.manifest_path().or_raise(|| ErrorKind::Config)?;
    let destination = std::path::absolute(&config.destination).or_raise(|| ErrorKind::Destination)?;

    // The destination root is only created once the manifest has opened.
    let db = Database::connect(&manifest).await.or_raise(|| ErrorKind::Manifest)?;
    let outcome = match backend(&destination, config.dry_run) {
        Ok(backend) => {
            tracing::info!(source = %source.display(), destination = %destination.display(), "extracting backup");
            drain(&backend, Repository::new(&db), &Resolver::new(source), domain).await
        },
        Err(e) => Err(e),
    };
    db.close().await;
    outcome
}

fn backend(destination: &Path, dry_run: bool) -> Result<BackendHandle> {
    let local: BackendHandle =
        Arc::new(LocalBackend::new("local", destination).or_raise(|| ErrorKind::Destination)?);
    Ok(match dry_run {
        true => Arc::new(ReadOnlyBackend::new(local)),
        false => local,
    })
}

/// Log every event of an extraction run, returning the final tally.
async fn drain(
    backend: &BackendHandle,
    manifest: Repository<'_>,
    resolver: &Resolver,
    domain: Option<&str>,
) -> Result<Summary> {
    let mut events = pin!(extract(backend, manifest, resolver, domain));
    while let Some(event) = events.next().await {
        match event.or_raise(|| ErrorKind::Extract)? {
            ExtractEvent::Started => tracing::debug!(backend = backend.name(), ?domain, "reading manifest"),
            ExtractEvent::DiscoveryComplete(total) => tracing::info!(total, "records found"),
            ExtractEvent::Extracted { file_id, action } => match &action {
                Action::Copied { path, bytes } => tracing::trace!(%file_id, path = %path.display(), bytes, "copied"),
                Action::Directory(path) => tracing::trace!(%file_id, path = %path.display(), "directory"),
                Action::Placeholder(path) => tracing::trace!(%file_id, path = %path.display(), "placeholder"),
            },
            ExtractEvent::Skipped { file_id, error } => tracing::warn!(%file_id, "skipped: {error:?}"),
            ExtractEvent::Complete(summary) => {
                tracing::info!(%summary, "extraction complete");
                return Ok(summary);
            },
        }
    }
    // The stream always ends with either `Complete` or an error.
    exn::bail!(ErrorKind::Extract)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_manifest_creates_no_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("_unback_");
        let config = Config {
            source: Some(dir.path().join("not-a-backup")),
            destination: destination.clone(),
            ..Config::default()
        };
        let err = run_extraction(&config, None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Manifest));
        assert!(!destination.exists());
    }
}
