use bytesize::ByteSize;
use domain::model::{
    entity::{NodeType, ResourceDescriptor},
    vo::ExtractedParameters,
};

/// Added on top of the memory ORCA asks for, in MB.
pub const MEMORY_SAFETY_MARGIN_MB: u64 = 50;

const MIB: u64 = 1024 * 1024;

/// Commit values found in the input file.
///
/// Fields of `data` that are already set are left untouched, only the
/// processor count may be topped up to what the input file requests.
pub fn merge_extracted(
    extracted: &ExtractedParameters,
    data: &mut ResourceDescriptor,
    files_copy_in: &mut Vec<String>,
) {
    files_copy_in.extend(extracted.copy_files.iter().cloned());

    if let Some(n_cpus) = extracted.n_cpus {
        let configured = data.no_procs();
        if configured < n_cpus {
            tracing::debug!(configured, requested = n_cpus, "topping up processors");
            data.add_node_type(NodeType {
                no_procs: n_cpus - configured,
            });
        }
    }

    if let Some(mem_per_cpu) = extracted.mem_per_cpu {
        let mut mem = mem_per_cpu;
        if let Some(n_cpus) = extracted.n_cpus {
            mem = mem.saturating_mul(n_cpus as u64);
        }
        let mem = match mem.saturating_add(MEMORY_SAFETY_MARGIN_MB).checked_mul(MIB) {
            Some(bytes) => ByteSize::b(bytes),
            None => {
                tracing::warn!(mem_per_cpu, "requested memory is not representable, using the maximum");
                ByteSize::b(u64::MAX)
            }
        };

        data.physical_memory.get_or_insert(mem);
        data.virtual_memory.get_or_insert(mem);
    }
}
