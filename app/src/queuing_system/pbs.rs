use domain::{
    model::entity::ResourceDescriptor,
    service::{CalculationEnvironment, QueueHeader},
};

use super::{format_duration, memory_mb, RETURN_VALUE};

pub struct Pbs {
    work_dir: String,
}

impl Pbs {
    pub fn new(work_dir: Option<String>) -> Self {
        Self {
            work_dir: work_dir.unwrap_or_else(|| "/tmp/$PBS_JOBID".to_owned()),
        }
    }
}

impl CalculationEnvironment for Pbs {
    fn return_value(&self) -> &str {
        RETURN_VALUE
    }

    fn submit_dir(&self) -> &str {
        "$PBS_O_WORKDIR"
    }

    fn work_dir(&self) -> &str {
        &self.work_dir
    }
}

impl QueueHeader for Pbs {
    fn header(&self, data: &ResourceDescriptor) -> String {
        let mut header = String::default();
        if let Some(name) = &data.job_name {
            header += &format!("#PBS -N {name}\n");
        }
        if !data.node_types.is_empty() {
            let nodes: Vec<String> = data
                .node_types
                .iter()
                .map(|node| format!("1:ppn={}", node.no_procs))
                .collect();
            header += &format!("#PBS -l nodes={}\n", nodes.join("+"));
        }
        if let Some(mem) = data.physical_memory {
            header += &format!("#PBS -l mem={}mb\n", memory_mb(mem));
        }
        if let Some(vmem) = data.virtual_memory {
            header += &format!("#PBS -l vmem={}mb\n", memory_mb(vmem));
        }
        if let Some(walltime) = data.walltime {
            header += &format!("#PBS -l walltime={}\n", format_duration(walltime));
        }
        if let Some(queue) = &data.queue {
            header += &format!("#PBS -q {queue}\n");
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use bytesize::ByteSize;
    use domain::{
        model::entity::{NodeType, ResourceDescriptor},
        service::{CalculationEnvironment, QueueHeader},
    };
    use indoc::indoc;

    use super::Pbs;

    #[test]
    fn header() {
        let data = ResourceDescriptor {
            node_types: vec![NodeType { no_procs: 4 }, NodeType { no_procs: 2 }],
            physical_memory: Some(ByteSize::gib(4)),
            virtual_memory: Some(ByteSize::mib(4200)),
            job_name: Some("benzene".to_owned()),
            walltime: Some(90),
            queue: None,
        };
        let expected = indoc! {"
            #PBS -N benzene
            #PBS -l nodes=1:ppn=4+1:ppn=2
            #PBS -l mem=4096mb
            #PBS -l vmem=4200mb
            #PBS -l walltime=00:01:30
        "};
        assert_eq!(Pbs::new(None).header(&data), expected);
    }

    #[test]
    fn work_dir_is_configurable() {
        assert_eq!(Pbs::new(None).work_dir(), "/tmp/$PBS_JOBID");
        assert_eq!(Pbs::new(Some("/scratch/x".to_owned())).work_dir(), "/scratch/x");
        assert_eq!(Pbs::new(None).submit_dir(), "$PBS_O_WORKDIR");
    }
}
