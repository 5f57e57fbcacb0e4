use crate::error::Error;
use crate::service::ServiceRef;

/// What to remove and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Service id (decimal or 0x-prefixed hexadecimal) or service name.
    pub service: String,
    /// Pass the stream through untouched when the service is absent.
    pub ignore_absent: bool,
    /// Leave the BAT as it is.
    pub ignore_bat: bool,
    /// Leave the NIT as it is.
    pub ignore_nit: bool,
    /// Replace removed packets with null packets instead of dropping them.
    pub stuffing: bool,
}

impl Options {
    pub fn new<S: Into<String>>(service: S) -> Self {
        Options {
            service: service.into(),
            ..Default::default()
        }
    }

    pub fn load<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<std::path::Path>,
    {
        let body = std::fs::read(path)?;
        Ok(toml::from_slice(&body)?)
    }

    pub fn service_ref(&self) -> Result<ServiceRef, Error> {
        Ok(ServiceRef::parse(&self.service)?)
    }
}
