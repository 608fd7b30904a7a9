mod pbs;
mod slurm;

use bytesize::ByteSize;
use domain::{model::vo::Synthesis, service::QueueHeader};
use serde::Deserialize;

#[rustfmt::skip]
pub use self::{
    pbs::Pbs,
    slurm::Slurm,
};

/// Variable the generated script keeps the payload's exit status in.
pub const RETURN_VALUE: &str = "RETURN";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum QueuingSystemKind {
    Slurm,
    Pbs,
}

/// Complete job script: shebang, submission header and the synthesized body.
pub fn jobscript<Q>(qsys: &Q, synthesis: &Synthesis) -> String
where
    Q: QueueHeader + ?Sized,
{
    let header = qsys.header(&synthesis.descriptor);
    format!("#!/bin/bash\n{header}\n{}", synthesis.script)
}

/// Memory in MB, rounded up.
fn memory_mb(memory: ByteSize) -> u64 {
    memory.as_u64().div_ceil(ByteSize::mib(1).as_u64())
}

fn format_duration(duration: u64) -> String {
    let hours = duration / 3600;
    let minutes = duration % 3600 / 60;
    let seconds = duration % 60;

    format!("{hours:0>2}:{minutes:0>2}:{seconds:0>2}")
}
