use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// An ORCA version found on the system, with everything needed to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrcaInstallation {
    pub version: String,
    pub executable: PathBuf,
    pub modules: Vec<String>,
}

/// Locate the ORCA executable below `basedir` and the MPI module it needs.
///
/// Without an explicit `version` the most recent installed one is used.
pub fn resolve(
    basedir: &Path,
    version: Option<&str>,
    mpi_modules: &BTreeMap<String, String>,
) -> anyhow::Result<OrcaInstallation> {
    let version = match version {
        Some(version) => version.to_owned(),
        None => determine_most_recent_version(basedir)?,
    };

    let executable = basedir.join(&version).join("orca");
    if !is_executable(&executable) {
        anyhow::bail!(
            "ORCA executable \"{}\" could not be found on the system. \
             Check that you supplied an ORCA version which is actually installed.",
            executable.display()
        );
    }

    let Some(module) = mpi_modules.get(&version) else {
        anyhow::bail!(
            "Could not determine openmpi version to use for ORCA version \"{version}\". \
             Please add it to the `mpi_modules` configuration."
        );
    };

    tracing::debug!(%version, executable = %executable.display(), "resolved ORCA installation");
    Ok(OrcaInstallation {
        version,
        executable,
        modules: vec![module.clone()],
    })
}

/// Name of the subdirectory of `basedir` with the highest version number.
pub fn determine_most_recent_version(basedir: &Path) -> anyhow::Result<String> {
    let entries = fs::read_dir(basedir)
        .with_context(|| format!("Unable to list ORCA versions in {}", basedir.display()))?;

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            versions.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    most_recent_version(versions.iter().map(String::as_str))
        .map(str::to_owned)
        .with_context(|| format!("No ORCA version installed in {}", basedir.display()))
}

pub fn most_recent_version<'a>(versions: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    versions.into_iter().max_by(|a, b| compare_versions(a, b))
}

/// Compare dotted versions component-wise, numerically where possible.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
