use domain::{
    model::entity::ResourceDescriptor,
    service::{CalculationEnvironment, QueueHeader},
};

use super::{format_duration, memory_mb, RETURN_VALUE};

pub struct Slurm {
    work_dir: String,
}

impl Slurm {
    pub fn new(work_dir: Option<String>) -> Self {
        Self {
            work_dir: work_dir.unwrap_or_else(|| "/tmp/$SLURM_JOB_ID".to_owned()),
        }
    }
}

impl CalculationEnvironment for Slurm {
    fn return_value(&self) -> &str {
        RETURN_VALUE
    }

    fn submit_dir(&self) -> &str {
        "$SLURM_SUBMIT_DIR"
    }

    fn work_dir(&self) -> &str {
        &self.work_dir
    }
}

impl QueueHeader for Slurm {
    fn header(&self, data: &ResourceDescriptor) -> String {
        let mut header = String::default();
        if let Some(name) = &data.job_name {
            header += &format!("#SBATCH --job-name={name}\n");
        }
        header += match data.no_procs() {
            0 => String::default(),
            n => format!("#SBATCH --ntasks={n}\n"),
        }
        .as_str();
        // Slurm has no separate limit for virtual memory
        if let Some(mem) = data.physical_memory {
            header += &format!("#SBATCH --mem={}M\n", memory_mb(mem));
        }
        if let Some(walltime) = data.walltime {
            header += &format!("#SBATCH --time={}\n", format_duration(walltime));
        }
        if let Some(queue) = &data.queue {
            header += &format!("#SBATCH --partition={queue}\n");
        }
        header
    }
}
