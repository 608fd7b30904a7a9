use crate::model::entity::ResourceDescriptor;

pub trait QueueHeader {
    /// Serialize the finalized resources into submission directives,
    /// one per line, without the shebang.
    fn header(&self, data: &ResourceDescriptor) -> String;
}
