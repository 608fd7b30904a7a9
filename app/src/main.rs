mod cli;
mod config;
mod queuing_system;

use std::fs;
use std::io::{self, Write};

use anyhow::Context;
use colored::Colorize;
use domain::{
    model::vo::OrcaArgs,
    service::{CalculationEnvironment, QueueHeader},
};
use service::{installation, prelude::*};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use self::cli::Cli;
use self::config::{build_config, JobscriptConfig};
use self::queuing_system::{jobscript, Pbs, QueuingSystemKind, Slurm};

fn main() -> anyhow::Result<()> {
    // stdout is reserved for the job script
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse_with_epilog();
    let config: JobscriptConfig = build_config(cli.config.as_deref())
        .and_then(|config| config.try_deserialize())
        .with_context(|| "Failed to build config".red())?;

    match cli.scheduler.unwrap_or(config.scheduler.r#type) {
        QueuingSystemKind::Slurm => run(&cli, &config, &Slurm::new(config.scheduler.work_dir.clone())),
        QueuingSystemKind::Pbs => run(&cli, &config, &Pbs::new(config.scheduler.work_dir.clone())),
    }
}

fn run<Q>(cli: &Cli, config: &JobscriptConfig, qsys: &Q) -> anyhow::Result<()>
where
    Q: CalculationEnvironment + QueueHeader,
{
    let installation = installation::resolve(
        &config.orca_basedir,
        cli.orca_version.as_deref(),
        &config.mpi_modules,
    )
    .with_context(|| "Cannot locate ORCA".red())?;

    let mut data = cli.resources();
    if data.queue.is_none() {
        data.queue.clone_from(&config.scheduler.queue);
    }

    let args = OrcaArgs {
        infile: cli.infile.clone(),
        outfile: cli.out.clone(),
        executable: Some(installation.executable),
        modules: installation.modules,
    };
    let synthesis = OrcaScriptBuilder::new(args, data)
        .and_then(|builder| builder.build(qsys))
        .with_context(|| "Cannot build job script".red())?;

    let script = jobscript(qsys, &synthesis);
    match &cli.output {
        Some(path) => fs::write(path, script)
            .with_context(|| format!("Unable to write job script to {}", path.display()).red())?,
        None => io::stdout().write_all(script.as_bytes())?,
    }

    tracing::info!(
        version = %installation.version,
        copy_in = synthesis.files_copy_in.len(),
        copy_out = synthesis.files_copy_work_out.len(),
        "job script written"
    );
    Ok(())
}
