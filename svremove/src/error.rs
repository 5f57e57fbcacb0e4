#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("sync_byte failed at packet {0}")]
    SyncByte(u64),
    #[error(transparent)]
    Service(#[from] crate::service::EmptyServiceError),
    #[error("invalid configuration file: {0}")]
    Config(#[from] toml::de::Error),
    #[error("cannot remove service {0}, processing aborted")]
    Aborted(String),
}
