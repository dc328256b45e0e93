use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not read device information")]
    Info,
    #[display("could not prepare the destination directory")]
    Destination,
    #[display("could not open the manifest")]
    Manifest,
    #[display("extraction aborted")]
    Extract,
}
