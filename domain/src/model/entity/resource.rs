use bytesize::ByteSize;

/// Scheduling requirements of one job, assembled during a synthesis run and
/// handed to the queue header serializer afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// 节点类型，每种类型带有自己的核心数
    pub node_types: Vec<NodeType>,
    /// 物理内存
    pub physical_memory: Option<ByteSize>,
    /// 虚拟内存
    pub virtual_memory: Option<ByteSize>,
    /// 作业名
    pub job_name: Option<String>,
    /// 最长墙钟时间 (s)
    pub walltime: Option<u64>,
    /// 队列
    pub queue: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeType {
    pub no_procs: usize,
}

impl ResourceDescriptor {
    /// Total number of processors over all node types.
    pub fn no_procs(&self) -> usize {
        self.node_types.iter().fold(0, |sum, node| sum.saturating_add(node.no_procs))
    }

    pub fn add_node_type(&mut self, node: NodeType) {
        self.node_types.push(node);
    }
}
