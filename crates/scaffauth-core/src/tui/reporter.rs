//! Terminal reporter using cliclack log lines and spinners

use crate::pipeline::Reporter;
use colored::Colorize;
use std::sync::Mutex;

pub struct ConsoleReporter {
    debug: bool,
    spinner: Mutex<Option<cliclack::ProgressBar>>,
}

impl ConsoleReporter {
    /// `debug` turns on `Reporter::debug` lines
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            spinner: Mutex::new(None),
        }
    }

    fn take_spinner(&self) -> Option<cliclack::ProgressBar> {
        self.spinner.lock().ok().and_then(|mut slot| slot.take())
    }
}

// Terminal write failures are dropped: there is nowhere left to report them.
impl Reporter for ConsoleReporter {
    fn intro(&self, title: &str) {
        let _ = cliclack::intro(title.bold().to_string());
    }

    fn step(&self, message: &str) {
        let _ = cliclack::log::step(message);
    }

    fn info(&self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn success(&self, message: &str) {
        let _ = cliclack::log::success(message);
    }

    fn warning(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }

    fn error(&self, message: &str) {
        let _ = cliclack::log::error(message);
    }

    fn debug(&self, message: &str) {
        if self.debug {
            let _ = cliclack::log::remark(format!("[debug] {}", message).dimmed().to_string());
        }
    }

    fn start(&self, message: &str) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(spinner) {
                previous.stop("");
            }
        }
    }

    fn stop(&self, message: &str) {
        match self.take_spinner() {
            Some(spinner) => spinner.stop(message),
            None => self.success(message),
        }
    }

    fn stop_error(&self, message: &str) {
        match self.take_spinner() {
            Some(spinner) => spinner.error(message),
            None => self.error(message),
        }
    }

    fn note(&self, title: &str, body: &str) {
        let _ = cliclack::note(title, body);
    }

    fn outro(&self, message: &str) {
        let _ = cliclack::outro(message.green().to_string());
    }

    fn cancel(&self, message: &str) {
        if let Some(spinner) = self.take_spinner() {
            spinner.cancel("");
        }
        let _ = cliclack::outro_cancel(message);
    }
}
