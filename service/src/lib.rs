pub mod directive;
pub mod hooks;
pub mod input_file;
pub mod installation;
pub mod merge;
pub mod orca;

pub mod prelude {
    #[rustfmt::skip]
    pub use super::{
        hooks::HookRegistry,
        input_file::ParsedInput,
        installation::OrcaInstallation,
        orca::OrcaScriptBuilder,
    };
}
