use async_stream::stream;
use derive_more::Display;
use exn::ResultExt;
use futures::Stream;
use unback_manifest::{Repository, Undecodable};
use unback_storage::BackendHandle;

use crate::error::{ErrorKind, Result};
use crate::extract::error::{RecordError, RecordErrorKind};
use crate::extract::record::{Action, extract_record};
use crate::resolve::Resolver;

/// Progress events emitted by [`extract`] as it works through the manifest.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    number of records to extract.
/// 3. [`Extracted`](Self::Extracted) or [`Skipped`](Self::Skipped): once per
///    record, in manifest order.
/// 4. [`Complete`](Self::Complete): exactly once, signalling the stream is
///    finished.
///
/// A fatal error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum ExtractEvent {
    Started,
    DiscoveryComplete(u64),
    Extracted { file_id: String, action: Action },
    /// The record could not be extracted; nothing was written for it.
    Skipped { file_id: String, error: RecordError },
    Complete(Summary),
}

/// Tally of a finished run.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
#[display(
    "{copied} files copied ({bytes} bytes), {directories} directories, {placeholders} placeholders, {skipped} skipped"
)]
pub struct Summary {
    pub copied: u64,
    pub bytes: u64,
    pub directories: u64,
    pub placeholders: u64,
    pub skipped: u64,
}
impl Summary {
    fn add(&mut self, action: &Action) {
        match action {
            Action::Copied { bytes, .. } => {
                self.copied += 1;
                self.bytes += bytes;
            },
            Action::Directory(_) => self.directories += 1,
            Action::Placeholder(_) => self.placeholders += 1,
        }
    }

    /// Number of records processed, skipped ones included.
    pub fn total(&self) -> u64 {
        self.copied + self.directories + self.placeholders + self.skipped
    }
}

/// Streams [`ExtractEvent`]s for every record in the manifest (or only those
/// of one domain), materializing each record in `backend`.
///
/// Records are fetched up front, then extracted one at a time in manifest
/// order. A record that fails is reported as [`Skipped`](ExtractEvent::Skipped)
/// and the run continues. A manifest query failure, or a directory that cannot
/// be created, is yielded as an `Err` item and ends the stream.
pub fn extract<'a>(
    backend: &'a BackendHandle,
    manifest: Repository<'a>,
    resolver: &'a Resolver,
    domain: Option<&'a str>,
) -> impl Stream<Item = Result<ExtractEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(ExtractEvent::Started);

        let records = match domain {
            Some(domain) => manifest.by_domain(domain).await,
            None => manifest.all().await,
        };
        let records = match records.or_raise(|| ErrorKind::Manifest) {
            Ok(records) => records,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(ExtractEvent::DiscoveryComplete(u64::try_from(records.len()).unwrap_or(u64::MAX)));

        let mut summary = Summary::default();
        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(Undecodable { file_id, column }) => {
                    summary.skipped += 1;
                    let error = RecordError::from(RecordErrorKind::Undecodable(column));
                    yield Ok(ExtractEvent::Skipped { file_id, error });
                    continue;
                },
            };
            match extract_record(backend, resolver, &record).await {
                Ok(action) => {
                    summary.add(&action);
                    yield Ok(ExtractEvent::Extracted { file_id: record.file_id, action });
                },
                Err(error) if error.is_fatal() => {
                    yield Err::<ExtractEvent, _>(error).or_raise(|| ErrorKind::Destination);
                    return;
                },
                Err(error) => {
                    summary.skipped += 1;
                    yield Ok(ExtractEvent::Skipped { file_id: record.file_id, error });
                },
            }
        }

        yield Ok(ExtractEvent::Complete(summary));
    })
}
