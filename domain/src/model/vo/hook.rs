use std::path::PathBuf;

/// Branch of the job script a hook is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Normal,
    /// Only executed when the payload reported a failure
    Error,
}

/// Script fragment contributors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook {
    /// Copy files from the submit directory into the working directory.
    CopyIn { files: Vec<String> },
    /// Run the program and determine its exit status.
    Payload(PayloadCommand),
    /// Copy files from the working directory back to the submit directory.
    CopyOut { files: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadCommand {
    pub executable: PathBuf,
    pub infile: String,
    pub outfile: String,
    /// Modules to load before the run, in order
    pub modules: Vec<String>,
    /// Marker the program prints on successful termination
    pub sentinel: String,
}
