use std::path::PathBuf;

use bytesize::ByteSize;
use clap::{CommandFactory, FromArgMatches, Parser};
use domain::model::{
    entity::{NodeType, ResourceDescriptor},
    vo::DirectiveKey,
};
use service::directive::{parse_duration, parse_memory};

use crate::queuing_system::QueuingSystemKind;

/// Build a queuing system job script for an ORCA calculation.
#[derive(Debug, Parser)]
#[command(name = "orca-jobscript", disable_version_flag = true)]
pub struct Cli {
    /// The path to the ORCA input file
    #[arg(value_name = "infile.inp")]
    pub infile: String,

    /// ORCA output filename (Default: infile + ".out")
    #[arg(long, value_name = "file")]
    pub out: Option<String>,

    /// Version string identifying the ORCA version to be used
    #[arg(long = "version", value_name = "version")]
    pub orca_version: Option<String>,

    /// Configuration file (Default: orca-jobscript.yaml if present)
    #[arg(long, value_name = "file")]
    pub config: Option<PathBuf>,

    /// Queuing system to write the job script for
    #[arg(long)]
    pub scheduler: Option<QueuingSystemKind>,

    /// Job name
    #[arg(short = 'N', long)]
    pub jobname: Option<String>,

    /// Number of processors
    #[arg(short = 'n', long)]
    pub ncpus: Option<usize>,

    /// Physical memory, e.g. 4GiB (a bare number is taken as MB)
    #[arg(long, value_parser = parse_memory)]
    pub mem: Option<ByteSize>,

    /// Virtual memory, e.g. 4GiB (a bare number is taken as MB)
    #[arg(long, value_parser = parse_memory)]
    pub vmem: Option<ByteSize>,

    /// Maximal wall time, [[D:]HH:]MM:SS or seconds
    #[arg(long, value_parser = parse_duration)]
    pub walltime: Option<u64>,

    /// Queue to submit to
    #[arg(short = 'q', long)]
    pub queue: Option<String>,

    /// Write the job script to this file instead of stdout
    #[arg(short = 'o', long, value_name = "file")]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Parse the command line, listing the `#QSYS` directives in the help text.
    pub fn parse_with_epilog() -> Self {
        let matches = Self::command().after_help(epilog()).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Resources explicitly requested on the command line.
    pub fn resources(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            node_types: self.ncpus.map(|no_procs| NodeType { no_procs }).into_iter().collect(),
            physical_memory: self.mem,
            virtual_memory: self.vmem,
            job_name: self.jobname.clone(),
            walltime: self.walltime,
            queue: self.queue.clone(),
        }
    }
}

pub fn epilog() -> String {
    let mut epilog = String::from(
        "The script tries to complete parameters and information which are not \n\
         explicitly provided on the commandline using the infile.inp input \n\
         file. This includes: \n   \
         - jobname (Name of the file), \n   \
         - output file name, \n   \
         - number of processors (using %pal and alike) \n   \
         - physical and virtual memory (using %maxcore and alike) \n\
         \nFurthermore QSYS directives are available in the orca input file\n\
         to further set the following properties:\n",
    );
    for key in DirectiveKey::all() {
        epilog += &format!("   #QSYS {key}=<value>     set {} to <value>\n", key.description());
    }
    epilog
}
