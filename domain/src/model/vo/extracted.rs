use std::fmt;

/// Scheduling hints recovered from one input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedParameters {
    /// Memory per core in MB, as given by `%maxcore`
    pub mem_per_cpu: Option<u64>,
    /// Number of processors, as given by `!PALn`
    pub n_cpus: Option<usize>,
    /// Files which have to be staged into the working directory
    pub copy_files: Vec<String>,
}

/// Syntax that was recognized but deliberately not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number in the input file
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
