/// Queue specific conventions the generated script relies on.
pub trait CalculationEnvironment {
    /// Name of the shell variable carrying the exit status of the payload.
    fn return_value(&self) -> &str;
    /// Shell expression for the directory the job was submitted from.
    fn submit_dir(&self) -> &str;
    /// Shell expression for the directory the payload runs in.
    fn work_dir(&self) -> &str;
}
