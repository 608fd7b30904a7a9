use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::*;

use crate::queuing_system::QueuingSystemKind;

const DEFAULT_CONFIG_NAME: &str = "orca-jobscript";
const ENV_PREFIX: &str = "ORCA_JOBSCRIPT";

#[derive(Debug, Clone, Deserialize)]
pub struct JobscriptConfig {
    #[serde(default = "JobscriptConfig::default_orca_basedir")]
    pub orca_basedir: PathBuf,

    /// ORCA version -> MPI module which needs to be loaded for it to run
    #[serde(default = "JobscriptConfig::default_mpi_modules")]
    pub mpi_modules: BTreeMap<String, String>,

    #[serde(default = "Default::default")]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "SchedulerConfig::default_type")]
    pub r#type: QueuingSystemKind,

    #[serde(default = "Default::default")]
    pub queue: Option<String>,

    /// Node local directory the calculation runs in
    #[serde(default = "Default::default")]
    pub work_dir: Option<String>,
}

impl JobscriptConfig {
    pub fn default_orca_basedir() -> PathBuf {
        PathBuf::from("/opt/software/Orca")
    }

    pub fn default_mpi_modules() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("4.0.0".to_owned(), "openmpi/gcc/1.8.2".to_owned()),
            ("3.0.3".to_owned(), "openmpi/gcc/1.8.2".to_owned()),
        ])
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            r#type: Self::default_type(),
            queue: None,
            work_dir: None,
        }
    }
}

impl SchedulerConfig {
    pub fn default_type() -> QueuingSystemKind {
        QueuingSystemKind::Slurm
    }
}

/// Layer the configuration file (optional unless given explicitly) and
/// `ORCA_JOBSCRIPT__*` environment variables.
pub fn build_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };
    Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
}
