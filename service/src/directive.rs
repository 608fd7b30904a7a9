use std::str::FromStr;

use bytesize::ByteSize;
use domain::{
    error::{DirectiveError, SynthesisError},
    model::{
        entity::{NodeType, ResourceDescriptor},
        vo::{Directive, DirectiveKey},
    },
};

/// Parse the payload of a `#QSYS` line, e.g. `jobname=run1`.
pub fn parse_directive(line: &str) -> Result<Directive, DirectiveError> {
    let (key, value) = line
        .split_once('=')
        .ok_or_else(|| DirectiveError::Malformed(line.to_owned()))?;
    let key = DirectiveKey::from_str(key.trim()).map_err(|_| DirectiveError::UnknownKey {
        key: key.trim().to_owned(),
        line: line.to_owned(),
    })?;

    let value = value.trim();
    let invalid = |reason: String| DirectiveError::InvalidValue {
        key,
        value: value.to_owned(),
        reason,
    };
    if value.is_empty() {
        return Err(invalid("value is empty".to_owned()));
    }

    Ok(match key {
        DirectiveKey::JobName => Directive::JobName(value.to_owned()),
        DirectiveKey::NCpus => match value.parse::<usize>() {
            Ok(0) => return Err(invalid("at least one processor is required".to_owned())),
            Ok(n) => Directive::NCpus(n),
            Err(e) => return Err(invalid(e.to_string())),
        },
        DirectiveKey::Mem => Directive::Mem(parse_memory(value).map_err(invalid)?),
        DirectiveKey::VMem => Directive::VMem(parse_memory(value).map_err(invalid)?),
        DirectiveKey::Walltime => Directive::Walltime(parse_duration(value).map_err(invalid)?),
        DirectiveKey::Queue => Directive::Queue(value.to_owned()),
    })
}

/// Write a directive into the descriptor, replacing whatever was set before.
pub fn apply(directive: Directive, data: &mut ResourceDescriptor) {
    match directive {
        Directive::JobName(name) => data.job_name = Some(name),
        Directive::NCpus(no_procs) => data.node_types = vec![NodeType { no_procs }],
        Directive::Mem(mem) => data.physical_memory = Some(mem),
        Directive::VMem(mem) => data.virtual_memory = Some(mem),
        Directive::Walltime(seconds) => data.walltime = Some(seconds),
        Directive::Queue(queue) => data.queue = Some(queue),
    }
}

/// Interpret all directives of one input file.
///
/// Every line is tried; if any of them fails the whole batch is reported
/// as an error, since an explicit override must not be dropped silently.
pub fn apply_directives<I, S>(lines: I, data: &mut ResourceDescriptor) -> Result<(), SynthesisError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut errors = Vec::new();
    for line in lines {
        let line = line.as_ref();
        match parse_directive(line) {
            Ok(directive) => {
                tracing::debug!(key = %directive.key(), directive = line, "applying #QSYS directive");
                apply(directive, data);
            }
            Err(e) => {
                tracing::error!(directive = line, "{e}");
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SynthesisError::Directives(errors))
    }
}

/// Memory sizes as understood by `bytesize` (`4GiB`, `500 MB`).
/// A bare number is taken as MB.
pub fn parse_memory(value: &str) -> Result<ByteSize, String> {
    let value = value.trim();
    if let Ok(mb) = value.parse::<u64>() {
        return mb
            .checked_mul(ByteSize::mib(1).as_u64())
            .map(ByteSize::b)
            .ok_or_else(|| format!("memory size `{value}` MB is too large"));
    }
    ByteSize::from_str(value)
}

/// `[[D:]HH:]MM:SS` or plain seconds.
pub fn parse_duration(value: &str) -> Result<u64, String> {
    let parts: Vec<&str> = value.trim().rsplit(':').collect();
    if parts.len() > 4 {
        return Err(format!("too many fields in duration `{value}`"));
    }

    let mut seconds = 0u64;
    for (i, part) in parts.into_iter().enumerate() {
        let amount: u64 = part
            .parse()
            .map_err(|_| format!("`{part}` is not a number in duration `{value}`"))?;
        let unit: u64 = match i {
            0 => 1,
            1 => 60,
            2 => 3_600,
            _ => 86_400,
        };
        seconds = unit
            .checked_mul(amount)
            .and_then(|part| seconds.checked_add(part))
            .ok_or_else(|| format!("duration `{value}` is too long"))?;
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use bytesize::ByteSize;
    use domain::{
        error::{DirectiveError, SynthesisError},
        model::{
            entity::{NodeType, ResourceDescriptor},
            vo::{Directive, DirectiveKey},
        },
    };

    use super::{apply_directives, parse_directive, parse_duration, parse_memory};

    #[test]
    fn parse_known_keys() {
        assert_eq!(parse_directive("jobname=run1"), Ok(Directive::JobName("run1".to_owned())));
        assert_eq!(parse_directive("JOBNAME = run1 "), Ok(Directive::JobName("run1".to_owned())));
        assert_eq!(parse_directive("ncpus=16"), Ok(Directive::NCpus(16)));
        assert_eq!(parse_directive("mem=4GiB"), Ok(Directive::Mem(ByteSize::gib(4))));
        assert_eq!(parse_directive("vmem=2048"), Ok(Directive::VMem(ByteSize::mib(2048))));
        assert_eq!(parse_directive("walltime=1:30:00"), Ok(Directive::Walltime(5_400)));
        assert_eq!(parse_directive("Queue=short"), Ok(Directive::Queue("short".to_owned())));
    }

    #[test]
    fn parse_failures() {
        assert_eq!(
            parse_directive("jobname run1"),
            Err(DirectiveError::Malformed("jobname run1".to_owned()))
        );
        assert!(matches!(
            parse_directive("nodes=2"),
            Err(DirectiveError::UnknownKey { key, .. }) if key == "nodes"
        ));
        assert!(matches!(
            parse_directive("ncpus=four"),
            Err(DirectiveError::InvalidValue { key: DirectiveKey::NCpus, .. })
        ));
        assert!(matches!(
            parse_directive("ncpus=0"),
            Err(DirectiveError::InvalidValue { key: DirectiveKey::NCpus, .. })
        ));
        assert!(matches!(
            parse_directive("jobname="),
            Err(DirectiveError::InvalidValue { key: DirectiveKey::JobName, .. })
        ));
    }

    #[test]
    fn directives_overwrite() {
        let mut data = ResourceDescriptor {
            job_name: Some("h2o".to_owned()),
            physical_memory: Some(ByteSize::mib(1000)),
            node_types: vec![NodeType { no_procs: 2 }, NodeType { no_procs: 2 }],
            ..Default::default()
        };
        apply_directives(["jobname=run1", "mem=512", "ncpus=8"], &mut data).unwrap();

        assert_eq!(data.job_name.as_deref(), Some("run1"));
        assert_eq!(data.physical_memory, Some(ByteSize::mib(512)));
        assert_eq!(data.node_types, [NodeType { no_procs: 8 }]);
    }

    #[test]
    fn failures_do_not_stop_remaining_directives() {
        let mut data = ResourceDescriptor::default();
        let err = apply_directives(["color=blue", "jobname=run1", "bogus"], &mut data).unwrap_err();

        assert_eq!(data.job_name.as_deref(), Some("run1"));
        match err {
            SynthesisError::Directives(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("90"), Ok(90));
        assert_eq!(parse_duration("10:00"), Ok(600));
        assert_eq!(parse_duration("02:00:00"), Ok(7_200));
        assert_eq!(parse_duration("1:00:00:00"), Ok(86_400));
        assert!(parse_duration("1:1:1:1:1").is_err());
        assert!(parse_duration("1h").is_err());
    }

    #[test]
    fn oversized_durations_are_rejected() {
        assert_eq!(parse_duration(&u64::MAX.to_string()), Ok(u64::MAX));
        assert!(parse_duration("99999999999999999:00:00:00").is_err());
        assert!(parse_duration(&format!("{}:00", u64::MAX)).is_err());
        assert!(parse_duration(&format!("1:{}", u64::MAX)).is_err());
        assert!(parse_duration("18446744073709551616").is_err());
    }

    #[test]
    fn memory_sizes() {
        assert_eq!(parse_memory("100"), Ok(ByteSize::mib(100)));
        assert_eq!(parse_memory("8GiB"), Ok(ByteSize::gib(8)));
        assert!(parse_memory("lots").is_err());
    }

    #[test]
    fn oversized_memory_is_rejected() {
        let max_mb = u64::MAX / (1024 * 1024);
        assert_eq!(parse_memory(&max_mb.to_string()), Ok(ByteSize::mib(max_mb)));
        assert!(parse_memory("99999999999999").is_err());
        assert!(parse_memory(&u64::MAX.to_string()).is_err());
    }

    #[test]
    fn oversized_values_are_invalid_directives() {
        for line in ["mem=99999999999999", "vmem=99999999999999", "walltime=99999999999999999:00:00:00"] {
            assert!(
                matches!(parse_directive(line), Err(DirectiveError::InvalidValue { .. })),
                "{line} was accepted"
            );
        }
        assert!(matches!(
            parse_directive(&format!("ncpus={}0", usize::MAX)),
            Err(DirectiveError::InvalidValue { key: DirectiveKey::NCpus, .. })
        ));
        assert_eq!(
            parse_directive(&format!("ncpus={}", usize::MAX)),
            Ok(Directive::NCpus(usize::MAX))
        );

        let mut data = ResourceDescriptor::default();
        let err = apply_directives(["mem=99999999999999", "jobname=big"], &mut data).unwrap_err();
        assert!(matches!(err, SynthesisError::Directives(errors) if errors.len() == 1));
        assert_eq!(data.physical_memory, None);
    }
}
