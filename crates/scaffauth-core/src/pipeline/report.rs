//! User-facing progress output

/// Sink for everything the user sees during a run.
///
/// Methods never fail; a reporter that cannot write to the terminal drops the
/// line. `debug` lines are only shown when the run was started with `--debug`.
pub trait Reporter: Send + Sync {
    fn intro(&self, title: &str);
    fn step(&self, message: &str);
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    fn debug(&self, message: &str);

    /// Start a spinner; at most one runs at a time
    fn start(&self, message: &str);
    /// Stop the spinner with a success line
    fn stop(&self, message: &str);
    /// Stop the spinner with a failure line
    fn stop_error(&self, message: &str);

    fn note(&self, title: &str, body: &str);
    fn outro(&self, message: &str);
    fn cancel(&self, message: &str);
}
