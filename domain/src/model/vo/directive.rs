use bytesize::ByteSize;
use strum::{EnumIter, EnumMessage, EnumString, IntoEnumIterator};

/// Keys accepted on `#QSYS key=value` lines of an input file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, EnumMessage, strum::Display,
)]
#[strum(ascii_case_insensitive)]
pub enum DirectiveKey {
    #[strum(serialize = "jobname", message = "job name")]
    JobName,
    #[strum(serialize = "ncpus", message = "number of processors")]
    NCpus,
    #[strum(serialize = "mem", message = "physical memory")]
    Mem,
    #[strum(serialize = "vmem", message = "virtual memory")]
    VMem,
    #[strum(serialize = "walltime", message = "maximal wall time")]
    Walltime,
    #[strum(serialize = "queue", message = "queue")]
    Queue,
}

impl DirectiveKey {
    /// Human readable name of the resource field the key controls.
    pub fn description(self) -> &'static str {
        self.get_message().unwrap_or_default()
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// A parsed override directive, ready to be written into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    JobName(String),
    NCpus(usize),
    Mem(ByteSize),
    VMem(ByteSize),
    /// Seconds
    Walltime(u64),
    Queue(String),
}

impl Directive {
    pub fn key(&self) -> DirectiveKey {
        match self {
            Self::JobName(_) => DirectiveKey::JobName,
            Self::NCpus(_) => DirectiveKey::NCpus,
            Self::Mem(_) => DirectiveKey::Mem,
            Self::VMem(_) => DirectiveKey::VMem,
            Self::Walltime(_) => DirectiveKey::Walltime,
            Self::Queue(_) => DirectiveKey::Queue,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::DirectiveKey;

    #[test]
    fn keys_match_case_insensitively() {
        assert_eq!(DirectiveKey::from_str("JobName"), Ok(DirectiveKey::JobName));
        assert_eq!(DirectiveKey::from_str("VMEM"), Ok(DirectiveKey::VMem));
        assert!(DirectiveKey::from_str("nodes").is_err());
    }

    #[test]
    fn every_key_has_a_description() {
        for key in DirectiveKey::all() {
            assert!(!key.description().is_empty(), "{key} has no description");
        }
        assert_eq!(DirectiveKey::NCpus.to_string(), "ncpus");
    }
}
