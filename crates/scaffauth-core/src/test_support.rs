//! Scripted prompter, recording reporter and fake adapters for unit tests

use crate::config::{DeploymentPlatform, ScaffoldConfig, Visibility};
use crate::error::{PromptError, RenderError, StageError, StageErrorKind};
use crate::pipeline::{Reporter, Toolchain};
use crate::prompt::{PromptOption, Prompter, Validator};
use crate::runtime::{
    DeployResult, Deployer, PackageInstaller, PackageManager, RemoteRepository, SourceHost,
    VersionControl,
};
use crate::templates::{ProjectGenerator, RenderReport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted answer
#[derive(Debug, Clone)]
pub enum Answer {
    Text(String),
    Index(usize),
    Indices(Vec<usize>),
    Bool(bool),
    Cancel,
    Fail,
}

impl Answer {
    pub fn text(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

/// Prompter answering from a fixed script, recording every question
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
    rejections: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    /// Validator messages for answers that were refused
    pub fn rejections(&self) -> Vec<String> {
        self.rejections.lock().unwrap().clone()
    }

    fn next(&self, message: &str) -> Result<Answer, PromptError> {
        self.asked.lock().unwrap().push(message.to_string());
        self.pop()
    }

    fn pop(&self) -> Result<Answer, PromptError> {
        match self.answers.lock().unwrap().pop_front() {
            Some(Answer::Cancel) | None => Err(PromptError::Cancelled),
            Some(Answer::Fail) => Err(PromptError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "terminal went away",
            ))),
            Some(answer) => Ok(answer),
        }
    }
}

fn unexpected(message: &str, answer: &Answer) -> ! {
    panic!("prompt {message:?} got unexpected answer {answer:?}")
}

impl Prompter for ScriptedPrompter {
    fn input(
        &self,
        message: &str,
        _placeholder: &str,
        default: Option<&str>,
        validate: Validator,
    ) -> Result<String, PromptError> {
        let mut answer = self.next(message)?;
        loop {
            let Answer::Text(text) = &answer else {
                unexpected(message, &answer)
            };
            let text = match (text.is_empty(), default) {
                (true, Some(default)) => default.to_string(),
                _ => text.clone(),
            };
            match validate(&text) {
                Ok(()) => return Ok(text),
                Err(reason) => {
                    self.rejections.lock().unwrap().push(reason);
                    answer = self.pop()?;
                }
            }
        }
    }

    fn select(
        &self,
        message: &str,
        options: &[PromptOption],
        _initial: usize,
    ) -> Result<usize, PromptError> {
        match self.next(message)? {
            Answer::Index(i) if i < options.len() => Ok(i),
            other => unexpected(message, &other),
        }
    }

    fn multiselect(
        &self,
        message: &str,
        _options: &[PromptOption],
        _initial: &[usize],
    ) -> Result<Vec<usize>, PromptError> {
        match self.next(message)? {
            Answer::Indices(indices) => Ok(indices),
            other => unexpected(message, &other),
        }
    }

    fn confirm(&self, message: &str, _default: bool) -> Result<bool, PromptError> {
        match self.next(message)? {
            Answer::Bool(value) => Ok(value),
            other => unexpected(message, &other),
        }
    }

    fn password(&self, message: &str) -> Result<String, PromptError> {
        match self.next(message)? {
            Answer::Text(value) => Ok(value),
            other => unexpected(message, &other),
        }
    }
}

/// Reporter that keeps every line as `(kind, message)`
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    /// Whether a line of `kind` contains `needle`
    pub fn contains(&self, kind: &str, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .any(|(k, m)| *k == kind && m.contains(needle))
    }

    fn push(&self, kind: &'static str, message: &str) {
        self.lines.lock().unwrap().push((kind, message.to_string()));
    }
}

impl Reporter for RecordingReporter {
    fn intro(&self, title: &str) {
        self.push("intro", title);
    }
    fn step(&self, message: &str) {
        self.push("step", message);
    }
    fn info(&self, message: &str) {
        self.push("info", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn warning(&self, message: &str) {
        self.push("warning", message);
    }
    fn error(&self, message: &str) {
        self.push("error", message);
    }
    fn debug(&self, message: &str) {
        self.push("debug", message);
    }
    fn start(&self, message: &str) {
        self.push("start", message);
    }
    fn stop(&self, message: &str) {
        self.push("stop", message);
    }
    fn stop_error(&self, message: &str) {
        self.push("stop_error", message);
    }
    fn note(&self, title: &str, body: &str) {
        self.push("note", &format!("{title}\n{body}"));
    }
    fn outro(&self, message: &str) {
        self.push("outro", message);
    }
    fn cancel(&self, message: &str) {
        self.push("cancel", message);
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeGenerator {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeGenerator {
    pub const FILES: usize = 4;

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectGenerator for FakeGenerator {
    async fn generate(
        &self,
        _config: &ScaffoldConfig,
        target: &Path,
    ) -> Result<RenderReport, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RenderError::Read {
                path: PathBuf::from("templates/hono/drizzle-postgres"),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        Ok(RenderReport {
            rendered: vec![target.join("package.json"), target.join(".env.example")],
            copied: vec![target.join("tsconfig.json"), target.join("src/index.ts")],
            directories: vec![target.join("src")],
        })
    }
}

#[derive(Debug, Clone)]
pub struct FakeInstaller {
    manager: PackageManager,
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl Default for FakeInstaller {
    fn default() -> Self {
        Self {
            manager: PackageManager::Npm,
            calls: Arc::default(),
            fail: false,
        }
    }
}

impl FakeInstaller {
    pub fn failing(manager: PackageManager) -> Self {
        Self {
            manager,
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackageInstaller for FakeInstaller {
    fn manager(&self) -> PackageManager {
        self.manager
    }

    async fn install(&self, _dir: &Path) -> Result<(), StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StageError::new(
                StageErrorKind::Install,
                format!("{} install failed", self.manager),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FakeVcs {
    available: bool,
    fail_push: bool,
    commits: Arc<Mutex<Vec<String>>>,
    pushes: Arc<Mutex<Vec<String>>>,
}

impl Default for FakeVcs {
    fn default() -> Self {
        Self {
            available: true,
            fail_push: false,
            commits: Arc::default(),
            pushes: Arc::default(),
        }
    }
}

impl FakeVcs {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    pub fn failing_push() -> Self {
        Self {
            fail_push: true,
            ..Self::default()
        }
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn init(&self, _dir: &Path) -> Result<(), StageError> {
        Ok(())
    }

    async fn commit_all(&self, _dir: &Path, message: &str) -> Result<(), StageError> {
        self.commits.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn add_remote_and_push(&self, _dir: &Path, url: &str) -> Result<(), StageError> {
        if self.fail_push {
            return Err(StageError::new(
                StageErrorKind::GitPush,
                "git push exited with status 128: permission denied",
            ));
        }
        self.pushes.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    fail_auth: bool,
    authentications: Arc<AtomicUsize>,
    created: Arc<Mutex<Vec<String>>>,
}

impl FakeHost {
    pub fn failing_auth() -> Self {
        Self {
            fail_auth: true,
            ..Self::default()
        }
    }

    pub fn authentications(&self) -> usize {
        self.authentications.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceHost for FakeHost {
    async fn authenticate(&self) -> Result<String, StageError> {
        self.authentications.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth {
            return Err(StageError::new(
                StageErrorKind::HostingAuth,
                "No GitHub token available",
            ));
        }
        Ok("test-token".to_string())
    }

    async fn create_repository(
        &self,
        _token: &str,
        name: &str,
        _visibility: Visibility,
        _description: Option<&str>,
    ) -> Result<RemoteRepository, StageError> {
        self.created.lock().unwrap().push(name.to_string());
        Ok(RemoteRepository {
            web_url: format!("https://github.com/octocat/{name}"),
            clone_url: format!("https://github.com/octocat/{name}.git"),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDeployer {
    fail: bool,
    platforms: Arc<Mutex<Vec<DeploymentPlatform>>>,
}

impl FakeDeployer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn platforms(&self) -> Vec<DeploymentPlatform> {
        self.platforms.lock().unwrap().clone()
    }
}

#[async_trait]
impl Deployer for FakeDeployer {
    async fn deploy(
        &self,
        config: &ScaffoldConfig,
        _dir: &Path,
    ) -> Result<DeployResult, StageError> {
        let Some(target) = &config.deployment else {
            return Err(StageError::new(StageErrorKind::Deploy, "no target"));
        };
        self.platforms.lock().unwrap().push(target.platform);
        if self.fail {
            return Err(StageError::new(
                StageErrorKind::Deploy,
                format!("{} exited with status 1", target.platform),
            ));
        }
        Ok(DeployResult::new(
            target.platform,
            format!("https://{}.example.app", config.project_name),
        ))
    }
}

/// Shared handles to a set of fakes; `toolchain()` boxes clones of them
#[derive(Debug, Clone, Default)]
pub struct Toolkit {
    pub generator: FakeGenerator,
    pub installer: FakeInstaller,
    pub vcs: FakeVcs,
    pub host: FakeHost,
    pub deployer: FakeDeployer,
}

impl Toolkit {
    pub fn toolchain(&self) -> Toolchain {
        Toolchain {
            generator: Box::new(self.generator.clone()),
            installer: Box::new(self.installer.clone()),
            vcs: Box::new(self.vcs.clone()),
            host: Box::new(self.host.clone()),
            deployer: Box::new(self.deployer.clone()),
        }
    }
}
