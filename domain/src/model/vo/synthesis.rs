use std::path::PathBuf;

use typed_builder::TypedBuilder;

use super::ParseWarning;
use crate::model::entity::ResourceDescriptor;

/// Program specific settings of one ORCA job.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct OrcaArgs {
    /// Path to the ORCA input file
    #[builder(setter(into))]
    pub infile: String,
    /// ORCA output filename
    #[builder(default, setter(strip_option, into))]
    pub outfile: Option<String>,
    /// Full path to the ORCA executable
    #[builder(default, setter(strip_option, into))]
    pub executable: Option<PathBuf>,
    /// Modules to load
    #[builder(default)]
    pub modules: Vec<String>,
}

/// Everything a synthesis run hands to the downstream collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub descriptor: ResourceDescriptor,
    /// Script body without queue header
    pub script: String,
    pub files_copy_in: Vec<String>,
    /// Copied out of the working directory on success
    pub files_copy_work_out: Vec<String>,
    /// Copied out of the working directory on failure
    pub files_copy_error_out: Vec<String>,
    pub warnings: Vec<ParseWarning>,
}
