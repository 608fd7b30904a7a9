pub mod resource;

#[rustfmt::skip]
pub use self::{
    resource::{NodeType, ResourceDescriptor},
};
