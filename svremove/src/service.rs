/// The service to remove, as designated by the user and completed from the
/// tables as they arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRef {
    id: Option<u16>,
    name: Option<String>,
    pmt_pid: Option<u16>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("empty service designation")]
pub struct EmptyServiceError;

impl ServiceRef {
    pub fn with_id(id: u16) -> Self {
        ServiceRef {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn with_name<S: Into<String>>(name: S) -> Self {
        ServiceRef {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// An integer (decimal or 0x-prefixed hexadecimal) designates a service
    /// id, anything else a service name.
    pub fn parse(arg: &str) -> Result<Self, EmptyServiceError> {
        let trimmed = arg.trim();
        if trimmed.is_empty() {
            return Err(EmptyServiceError);
        }
        let id = if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            u16::from_str_radix(hex, 16).ok()
        } else {
            trimmed.parse::<u16>().ok()
        };
        Ok(match id {
            Some(id) => ServiceRef::with_id(id),
            None => ServiceRef::with_name(arg),
        })
    }

    pub fn id(&self) -> Option<u16> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn pmt_pid(&self) -> Option<u16> {
        self.pmt_pid
    }

    /// Fills in the id. The first id wins.
    pub fn set_id(&mut self, id: u16) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }

    pub fn set_pmt_pid(&mut self, pid: u16) {
        self.pmt_pid = Some(pid);
    }

    /// Compares `name` with the designated name, ignoring case and blanks.
    pub fn matches_name(&self, name: &str) -> bool {
        match self.name {
            Some(ref own) => simplify(own) == simplify(name),
            None => false,
        }
    }
}

impl std::fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.id, &self.name) {
            (Some(id), Some(name)) => write!(f, "\"{}\" (0x{:04X})", name, id),
            (Some(id), None) => write!(f, "0x{:04X} ({})", id, id),
            (None, Some(name)) => write!(f, "\"{}\"", name),
            (None, None) => f.write_str("<unspecified>"),
        }
    }
}

fn simplify(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
