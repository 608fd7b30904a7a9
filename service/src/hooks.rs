use std::path::Path;

use domain::{
    model::vo::{Hook, PayloadCommand, Phase},
    service::CalculationEnvironment,
};
use indoc::formatdoc;

/// Setup runs before anything else.
pub const COPY_IN_PRIORITY: i32 = -1000;
/// Normal-phase hooks with a higher priority than the payload only run on success.
pub const PAYLOAD_PRIORITY: i32 = 0;
pub const COPY_OUT_PRIORITY: i32 = 900;
pub const ERROR_COPY_OUT_PRIORITY: i32 = -1000;

#[derive(Debug)]
struct Registered {
    hook: Hook,
    priority: i32,
    phase: Phase,
}

/// Ordered collection of script fragment contributors for one job script.
///
/// Hooks are rendered by phase, then by priority; hooks of equal priority
/// keep the order they were registered in.
#[derive(Debug, Default)]
pub struct HookRegistry {
    hooks: Vec<Registered>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: Hook, priority: i32, phase: Phase) {
        self.hooks.push(Registered {
            hook,
            priority,
            phase,
        });
    }

    pub fn add_payload_hook(&mut self, hook: Hook, priority: i32) {
        self.register(hook, priority, Phase::Normal);
    }

    pub fn add_error_hook(&mut self, hook: Hook, priority: i32) {
        self.register(hook, priority, Phase::Error);
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    fn ordered(&self, phase: Phase) -> Vec<&Registered> {
        let mut hooks: Vec<_> = self.hooks.iter().filter(|h| h.phase == phase).collect();
        // stable: equal priorities stay in registration order
        hooks.sort_by_key(|h| h.priority);
        hooks
    }

    /// Render the script body.
    ///
    /// Normal-phase hooks up to [`PAYLOAD_PRIORITY`] always run. Afterwards a
    /// single branch on the exit status variable runs the remaining
    /// normal-phase hooks on success and the error-phase hooks otherwise.
    pub fn render<E>(&self, env: &E) -> String
    where
        E: CalculationEnvironment + ?Sized,
    {
        let ret = env.return_value();
        let (always, on_success): (Vec<_>, Vec<_>) = self
            .ordered(Phase::Normal)
            .into_iter()
            .partition(|h| h.priority <= PAYLOAD_PRIORITY);
        let on_error = self.ordered(Phase::Error);

        let mut sections = Vec::new();
        if !always.is_empty() {
            sections.push(render_all(&always, env));
        }

        match (on_success.is_empty(), on_error.is_empty()) {
            (true, true) => {}
            (false, true) => sections.push(format!(
                "if [ \"${ret}\" = \"0\" ]; then\n{}fi",
                indent(&render_all(&on_success, env))
            )),
            (true, false) => sections.push(format!(
                "if [ \"${ret}\" != \"0\" ]; then\n{}fi",
                indent(&render_all(&on_error, env))
            )),
            (false, false) => sections.push(format!(
                "if [ \"${ret}\" = \"0\" ]; then\n{}else\n{}fi",
                indent(&render_all(&on_success, env)),
                indent(&render_all(&on_error, env))
            )),
        }

        sections.push(format!("exit ${ret}"));
        let mut script = sections.join("\n\n");
        script.push('\n');
        script
    }
}

fn render_all<E>(hooks: &[&Registered], env: &E) -> String
where
    E: CalculationEnvironment + ?Sized,
{
    hooks
        .iter()
        .map(|h| render_hook(&h.hook, h.phase, env).trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_hook<E>(hook: &Hook, phase: Phase, env: &E) -> String
where
    E: CalculationEnvironment + ?Sized,
{
    match hook {
        Hook::CopyIn { files } => copy_in(files, env),
        Hook::Payload(payload) => run_payload(payload, env),
        Hook::CopyOut { files } => copy_out(files, phase, env),
    }
}

fn copy_in<E>(files: &[String], env: &E) -> String
where
    E: CalculationEnvironment + ?Sized,
{
    let submit = env.submit_dir();
    let work = env.work_dir();

    let mut string = String::from("# copy input files to the working directory\n");
    string += &format!("mkdir -p \"{work}\"\n");
    for file in files {
        // relative paths are relative to the submit directory
        let source = if Path::new(file).is_absolute() {
            escape(file)
        } else {
            format!("{submit}/{}", escape(file))
        };
        string += &format!("cp \"{source}\" \"{work}/\"\n");
    }
    string += &format!("cd \"{work}\"\n");
    string
}

fn copy_out<E>(files: &[String], phase: Phase, env: &E) -> String
where
    E: CalculationEnvironment + ?Sized,
{
    let submit = env.submit_dir();
    let work = env.work_dir();

    let mut string = match phase {
        Phase::Normal => String::from("# copy results back to the submit directory\n"),
        Phase::Error => String::from("# copy files for error analysis back to the submit directory\n"),
    };
    for file in files {
        let file = escape(file);
        string += &format!("[ -f \"{work}/{file}\" ] && cp \"{work}/{file}\" \"{submit}/\"\n");
    }
    string
}

fn run_payload<E>(payload: &PayloadCommand, env: &E) -> String
where
    E: CalculationEnvironment + ?Sized,
{
    let ret = env.return_value();
    let PayloadCommand {
        executable,
        infile,
        outfile,
        modules,
        sentinel,
    } = payload;

    let program_dir = executable.parent().unwrap_or(Path::new("."));
    let mut environment = format!("export PATH=\"{}:$PATH\"\n", escape(&program_dir.to_string_lossy()));
    for module in modules {
        environment += &format!("module load {module}\n");
    }

    let executable = escape(&executable.to_string_lossy());
    let infile = escape(infile);
    let outfile = escape(outfile);
    let sentinel = escape(sentinel);

    formatdoc! {r#"
        {environment}
        "{executable}" "{infile}" > "{outfile}"
        {ret}=$?

        # check if job terminated successfully
        if ! grep -qF "{sentinel}" "{outfile}"; then
            {ret}=1
        fi
    "#}
}

/// Escape a value for use inside double quotes.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_owned()
            } else {
                format!("    {line}\n")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use domain::{
        model::vo::{Hook, PayloadCommand},
        service::CalculationEnvironment,
    };
    use indoc::indoc;

    use super::{escape, HookRegistry, COPY_IN_PRIORITY, COPY_OUT_PRIORITY, ERROR_COPY_OUT_PRIORITY};

    struct TestEnvironment;

    impl CalculationEnvironment for TestEnvironment {
        fn return_value(&self) -> &str {
            "RET"
        }

        fn submit_dir(&self) -> &str {
            "$SUBMIT"
        }

        fn work_dir(&self) -> &str {
            "$WORK"
        }
    }

    fn copy_in(file: &str) -> Hook {
        Hook::CopyIn {
            files: vec![file.to_owned()],
        }
    }

    fn payload() -> Hook {
        Hook::Payload(PayloadCommand {
            executable: PathBuf::from("/opt/orca/4.0.0/orca"),
            infile: "h2o.inp".to_owned(),
            outfile: "h2o.out".to_owned(),
            modules: vec!["openmpi/gcc/1.8.2".to_owned()],
            sentinel: "****ORCA TERMINATED NORMALLY****".to_owned(),
        })
    }

    #[test]
    fn renders_full_script() {
        let mut registry = HookRegistry::new();
        registry.add_payload_hook(copy_in("h2o.inp"), COPY_IN_PRIORITY);
        registry.add_payload_hook(payload(), 0);
        registry.add_payload_hook(
            Hook::CopyOut {
                files: vec!["h2o.out".to_owned(), "h2o.gbw".to_owned()],
            },
            COPY_OUT_PRIORITY,
        );
        registry.add_error_hook(
            Hook::CopyOut {
                files: vec!["h2o.out".to_owned()],
            },
            ERROR_COPY_OUT_PRIORITY,
        );

        let expected = indoc! {r#"
            # copy input files to the working directory
            mkdir -p "$WORK"
            cp "$SUBMIT/h2o.inp" "$WORK/"
            cd "$WORK"

            export PATH="/opt/orca/4.0.0:$PATH"
            module load openmpi/gcc/1.8.2

            "/opt/orca/4.0.0/orca" "h2o.inp" > "h2o.out"
            RET=$?

            # check if job terminated successfully
            if ! grep -qF "****ORCA TERMINATED NORMALLY****" "h2o.out"; then
                RET=1
            fi

            if [ "$RET" = "0" ]; then
                # copy results back to the submit directory
                [ -f "$WORK/h2o.out" ] && cp "$WORK/h2o.out" "$SUBMIT/"
                [ -f "$WORK/h2o.gbw" ] && cp "$WORK/h2o.gbw" "$SUBMIT/"
            else
                # copy files for error analysis back to the submit directory
                [ -f "$WORK/h2o.out" ] && cp "$WORK/h2o.out" "$SUBMIT/"
            fi

            exit $RET
        "#};
        assert_eq!(registry.render(&TestEnvironment), expected);
    }

    #[test]
    fn order_follows_priority_not_insertion() {
        let mut forward = HookRegistry::new();
        forward.add_payload_hook(copy_in("a"), -10);
        forward.add_payload_hook(copy_in("b"), -5);

        let mut backward = HookRegistry::new();
        backward.add_payload_hook(copy_in("b"), -5);
        backward.add_payload_hook(copy_in("a"), -10);

        let script = forward.render(&TestEnvironment);
        assert_eq!(script, backward.render(&TestEnvironment));
        assert!(script.find("/a\"").unwrap() < script.find("/b\"").unwrap());
    }

    #[test]
    fn equal_priorities_keep_insertion_order() {
        let mut registry = HookRegistry::new();
        registry.add_payload_hook(copy_in("second"), -1);
        registry.add_payload_hook(copy_in("first"), -1);

        let script = registry.render(&TestEnvironment);
        assert!(script.find("/second\"").unwrap() < script.find("/first\"").unwrap());
    }

    #[test]
    fn error_hooks_only_render_error_branch() {
        let mut registry = HookRegistry::new();
        registry.add_payload_hook(payload(), 0);
        registry.add_error_hook(
            Hook::CopyOut {
                files: vec!["h2o.out".to_owned()],
            },
            ERROR_COPY_OUT_PRIORITY,
        );

        let script = registry.render(&TestEnvironment);
        assert!(script.contains("if [ \"$RET\" != \"0\" ]; then\n    # copy files for error"));
        assert!(!script.contains("else"));
        assert!(script.ends_with("fi\n\nexit $RET\n"));
    }

    #[test]
    fn empty_registry_only_exits() {
        let registry = HookRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.render(&TestEnvironment), "exit $RET\n");
    }

    #[test]
    fn absolute_inputs_are_copied_as_is() {
        let mut registry = HookRegistry::new();
        registry.add_payload_hook(
            Hook::CopyIn {
                files: vec!["/home/u/calc/w.inp".to_owned(), "calc/w.xyz".to_owned()],
            },
            COPY_IN_PRIORITY,
        );

        let script = registry.render(&TestEnvironment);
        assert!(script.contains("cp \"/home/u/calc/w.inp\" \"$WORK/\"\n"));
        assert!(script.contains("cp \"$SUBMIT/calc/w.xyz\" \"$WORK/\"\n"));
        assert!(!script.contains("$SUBMIT//"));
    }

    #[test]
    fn escapes_shell_specials() {
        assert_eq!(escape(r#"my "job" $HOME"#), r#"my \"job\" \$HOME"#);
    }
}
