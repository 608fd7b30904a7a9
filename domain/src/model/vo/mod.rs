pub mod directive;
pub mod extracted;
pub mod hook;
pub mod synthesis;

#[rustfmt::skip]
pub use self::{
    directive::{Directive, DirectiveKey},
    extracted::{ExtractedParameters, ParseWarning},
    hook::{Hook, PayloadCommand, Phase},
    synthesis::{OrcaArgs, Synthesis},
};
