use std::ffi::OsStr;
use std::path::Path;

use domain::{
    error::SynthesisError,
    model::{
        entity::ResourceDescriptor,
        vo::{Hook, OrcaArgs, PayloadCommand, Synthesis},
    },
    service::CalculationEnvironment,
};

use crate::{
    directive::apply_directives,
    hooks::{
        HookRegistry, COPY_IN_PRIORITY, COPY_OUT_PRIORITY, ERROR_COPY_OUT_PRIORITY,
        PAYLOAD_PRIORITY,
    },
    input_file::{self, ParsedInput},
    merge::merge_extracted,
};

/// Printed by ORCA as the last line of a successful run.
pub const ORCA_SENTINEL: &str = "****ORCA TERMINATED NORMALLY****";

const INPUT_EXTENSIONS: [&str; 2] = ["in", "inp"];
// ORCA does not always strip the extension, so both prefixes are tried
const WORK_FILE_SUFFIXES: [&str; 3] = [".prop", ".gbw", "_property.txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
enum Stage {
    Parsing,
    Merging,
    DirectiveApplication,
    HookPopulation,
    Rendering,
    Done,
}

/// Builds the job script of one ORCA calculation.
///
/// The values explicitly given by the caller take precedence over what is
/// found in the input file, while `#QSYS` directives in the input file
/// override both.
#[derive(Debug)]
pub struct OrcaScriptBuilder {
    args: OrcaArgs,
    data: ResourceDescriptor,
    /// Files that should be copied into the workdir
    files_copy_in: Vec<String>,
    /// Files that should be copied out of the workdir on successful execution
    files_copy_work_out: Vec<String>,
    /// Files that should be copied out of the workdir if an error occurs
    files_copy_error_out: Vec<String>,
}

impl OrcaScriptBuilder {
    /// Complete output file, job name and staging lists from the input file name.
    pub fn new(mut args: OrcaArgs, mut data: ResourceDescriptor) -> Result<Self, SynthesisError> {
        if args.infile.trim().is_empty() {
            return Err(SynthesisError::Configuration("no ORCA input file given".to_owned()));
        }

        let stem = job_stem(&args.infile);
        let outfile = args.outfile.get_or_insert_with(|| format!("{stem}.out")).clone();
        if data.job_name.is_none() {
            data.job_name = Some(stem);
        }

        Ok(Self {
            files_copy_in: vec![args.infile.clone()],
            files_copy_work_out: work_files(&args.infile, &outfile),
            files_copy_error_out: vec![outfile],
            args,
            data,
        })
    }

    pub fn args(&self) -> &OrcaArgs {
        &self.args
    }

    /// Read the input file and build the script.
    pub fn build<E>(self, env: &E) -> Result<Synthesis, SynthesisError>
    where
        E: CalculationEnvironment + ?Sized,
    {
        enter(Stage::Parsing);
        let parsed = input_file::parse_file(Path::new(&self.args.infile))?;
        self.build_from(parsed, env)
    }

    /// Build the script from an input file that was already parsed.
    pub fn build_from<E>(mut self, parsed: ParsedInput, env: &E) -> Result<Synthesis, SynthesisError>
    where
        E: CalculationEnvironment + ?Sized,
    {
        let ParsedInput {
            extracted,
            directives,
            warnings,
        } = parsed;

        enter(Stage::Merging);
        merge_extracted(&extracted, &mut self.data, &mut self.files_copy_in);

        enter(Stage::DirectiveApplication);
        apply_directives(&directives, &mut self.data)?;

        enter(Stage::HookPopulation);
        let registry = self.populate_hooks()?;

        enter(Stage::Rendering);
        let script = registry.render(env);

        enter(Stage::Done);
        tracing::info!(
            job_name = self.data.job_name.as_deref().unwrap_or_default(),
            procs = self.data.no_procs(),
            warnings = warnings.len(),
            "built ORCA job script"
        );

        Ok(Synthesis {
            descriptor: self.data,
            script,
            files_copy_in: self.files_copy_in,
            files_copy_work_out: self.files_copy_work_out,
            files_copy_error_out: self.files_copy_error_out,
            warnings,
        })
    }

    fn populate_hooks(&self) -> Result<HookRegistry, SynthesisError> {
        let executable = self
            .args
            .executable
            .clone()
            .ok_or(SynthesisError::NotReady("no path to an ORCA executable"))?;
        let outfile =
            self.args.outfile.clone().ok_or(SynthesisError::NotReady("no output file provided"))?;

        // The input file is staged into the workdir, so it is run by name.
        let infile = Path::new(&self.args.infile)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.args.infile.clone());

        let mut registry = HookRegistry::new();
        registry.add_payload_hook(
            Hook::CopyIn {
                files: self.files_copy_in.clone(),
            },
            COPY_IN_PRIORITY,
        );
        registry.add_payload_hook(
            Hook::Payload(PayloadCommand {
                executable,
                infile,
                outfile,
                modules: self.args.modules.clone(),
                sentinel: ORCA_SENTINEL.to_owned(),
            }),
            PAYLOAD_PRIORITY,
        );
        registry.add_payload_hook(
            Hook::CopyOut {
                files: self.files_copy_work_out.clone(),
            },
            COPY_OUT_PRIORITY,
        );
        registry.add_error_hook(
            Hook::CopyOut {
                files: self.files_copy_error_out.clone(),
            },
            ERROR_COPY_OUT_PRIORITY,
        );
        Ok(registry)
    }
}

fn enter(stage: Stage) {
    tracing::debug!(%stage, "ORCA script synthesis");
}

/// Input file name without directory and without a `.in`/`.inp` extension.
/// Other extensions are kept.
pub fn job_stem(infile: &str) -> String {
    let path = Path::new(infile);
    let strip = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext));
    let name = if strip {
        path.file_stem()
    } else {
        path.file_name()
    };
    name.map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| infile.to_owned())
}

/// Files possibly generated by an ORCA run. They need not exist, the
/// generated script only copies those that do.
pub fn work_files(infile: &str, outfile: &str) -> Vec<String> {
    let path = Path::new(infile);
    let prefixes = [path.file_stem(), path.file_name()];

    let mut files = vec![outfile.to_owned()];
    for prefix in prefixes.into_iter().flatten() {
        let prefix = prefix.to_string_lossy();
        for suffix in WORK_FILE_SUFFIXES {
            let file = format!("{prefix}{suffix}");
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }
    files
}
