use std::fs;
use std::path::Path;

use domain::{
    error::SynthesisError,
    model::vo::{ExtractedParameters, ParseWarning},
};

/// Opens and closes a comment on the same line.
const COMMENT: char = '#';
const DIRECTIVE_PREFIX: &str = "#QSYS";
const SIMPLE_INPUT: char = '!';
const GEOMETRY_INPUT: char = '*';
const MAXCORE: &str = "%maxcore";
const MAXCORE_NEAR_MISS: &str = "% maxcore";
const PAL: &str = "pal";
const SECTION_START: char = '%';
const SECTION_END: &str = "end";

/// Result of scanning one ORCA input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInput {
    pub extracted: ExtractedParameters,
    /// Payload of every `#QSYS` line, prefix removed and trimmed
    pub directives: Vec<String>,
    pub warnings: Vec<ParseWarning>,
}

pub fn parse_file(path: &Path) -> Result<ParsedInput, SynthesisError> {
    let content = fs::read_to_string(path).map_err(|source| SynthesisError::Io {
        path: path.to_owned(),
        source,
    })?;
    tracing::debug!(infile = %path.display(), "parsing ORCA input file");
    Ok(parse_str(&content))
}

pub fn parse_str(content: &str) -> ParsedInput {
    let mut parsed = ParsedInput::default();
    // Lines not understood here, kept for the section parser
    let mut other_lines = String::new();

    for (index, raw) in content.lines().enumerate() {
        let lineno = index + 1;

        if let Some(directive) = raw.strip_prefix(DIRECTIVE_PREFIX) {
            parsed.directives.push(directive.trim().to_owned());
        }

        let line = remove_comments(raw);
        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(SIMPLE_INPUT) {
            parse_simple_line(rest, &mut parsed.extracted);
        } else if let Some(rest) = line.strip_prefix(GEOMETRY_INPUT) {
            parse_geometry_line(rest, &mut parsed.extracted);
        } else if let Some(rest) = line.strip_prefix(MAXCORE) {
            match rest.split_whitespace().next().map(str::parse::<u64>) {
                Some(Ok(mem)) => {
                    let extracted = &mut parsed.extracted;
                    extracted.mem_per_cpu = Some(extracted.mem_per_cpu.map_or(mem, |m| m.max(mem)));
                }
                _ => warn(
                    &mut parsed.warnings,
                    lineno,
                    format!("Could not read a memory value from \"{}\", ignored.", line.trim()),
                ),
            }
        } else if line.starts_with(MAXCORE_NEAR_MISS) {
            warn(
                &mut parsed.warnings,
                lineno,
                "Unknown keyword \"% maxcore\" is a close match to \"%maxcore\", but is ignored."
                    .to_owned(),
            );
        } else {
            other_lines.push_str(&line);
            other_lines.push('\n');
        }
    }

    parse_sections(&other_lines, &mut parsed.extracted);
    parsed
}

/// Strip comments from an ORCA input line.
///
/// In ORCA input `#` both starts and ends a comment, so the line is split at
/// every `#` and only every second part (starting with the first) is kept.
/// An odd number of `#` therefore comments out the rest of the line.
pub fn remove_comments(line: &str) -> String {
    line.split(COMMENT).step_by(2).collect()
}

/// Simple input lines (`! B3LYP def2-SVP PAL4`) are read word by word.
fn parse_simple_line(line: &str, extracted: &mut ExtractedParameters) {
    for word in line.to_lowercase().split_whitespace() {
        let Some(count) = word.strip_prefix(PAL) else {
            continue;
        };
        let Ok(n_cpus) = count.parse::<usize>() else {
            continue;
        };
        if extracted.n_cpus.is_none() {
            extracted.n_cpus = Some(n_cpus);
        }
    }
}

/// Lines loading the molecule from an external file
/// (`* xyzfile 0 1 geom.xyz`, `* gzmtfile ...`).
///
/// The referenced file is not staged yet, the line is only recognized.
fn parse_geometry_line(line: &str, _extracted: &mut ExtractedParameters) {
    tracing::trace!(line = line.trim(), "geometry reference not interpreted");
}

/// Split the remaining input into `%name ... end` blocks.
fn parse_sections(buffer: &str, extracted: &mut ExtractedParameters) {
    let mut current: Option<(&str, Vec<&str>)> = None;

    for word in buffer.split_whitespace() {
        match current.as_mut() {
            None => {
                if let Some(name) = word.strip_prefix(SECTION_START) {
                    current = Some((name, Vec::new()));
                }
            }
            // `% pal` puts the name into the next word
            Some((name, _)) if name.is_empty() => *name = word,
            Some((name, body)) if word == SECTION_END => {
                parse_section(name, body, extracted);
                current = None;
            }
            Some((_, body)) => body.push(word),
        }
    }
}

/// Extension point for the content of input blocks such as
/// `%pal nprocs 4 end`. Nothing is extracted from them yet.
fn parse_section(section: &str, body: &[&str], _extracted: &mut ExtractedParameters) {
    tracing::trace!(section, words = body.len(), "input block not interpreted");
}

fn warn(warnings: &mut Vec<ParseWarning>, line: usize, message: String) {
    tracing::warn!(line, "{message}");
    warnings.push(ParseWarning { line, message });
}
