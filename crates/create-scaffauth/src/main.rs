//! create-scaffauth - Scaffold a production-ready Better Auth backend

mod logging;

use clap::{Parser, Subcommand};
use scaffauth_core::init::{run_init, InitEnvironment, InitOptions, InitOutcome};
use scaffauth_core::pipeline::{Reporter, Toolchain};
use scaffauth_core::prompt::Prompter;
use scaffauth_core::runtime::PackageManager;
use scaffauth_core::templates::TemplateRoot;
use scaffauth_core::tui::{CliclackPrompter, ConsoleReporter};
use std::io::IsTerminal as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "create-scaffauth")]
#[command(about = "CLI for scaffolding production-ready Better Auth backends")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub init: InitArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new auth backend (the default)
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone, Default)]
pub struct InitArgs {
    /// Skip prompts and use the default stack (Hono + Drizzle + PostgreSQL)
    #[arg(short, long)]
    pub yes: bool,

    /// Skip dependency installation
    #[arg(long = "no-install")]
    pub no_install: bool,

    /// Skip git initialization
    #[arg(long = "no-git")]
    pub no_git: bool,

    /// Stack to generate, e.g. hono/drizzle-postgres
    #[arg(short, long, value_name = "FRAMEWORK/ORM-DATABASE")]
    pub template: Option<String>,

    /// Show debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Template root to render from.
    ///
    /// Defaults to $SCAFFAUTH_TEMPLATE_DIR, then a `templates/` directory next
    /// to the executable, then the source checkout the binary was built from.
    /// Installed binaries without `templates/` beside them need this flag or
    /// the variable.
    #[arg(long = "template-dir", value_name = "DIR")]
    pub template_dir: Option<PathBuf>,
}

impl From<InitArgs> for InitOptions {
    fn from(args: InitArgs) -> Self {
        InitOptions {
            yes: args.yes,
            install: !args.no_install,
            git: !args.no_git,
            template: args.template,
            debug: args.debug,
            template_dir: args.template_dir,
        }
    }
}

impl Args {
    /// `init` flags, whether or not the subcommand was spelled out
    pub fn into_options(self) -> InitOptions {
        match self.command {
            Some(Command::Init(args)) => args.into(),
            None => self.init.into(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C outside prompts
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let options = Args::parse().into_options();

    if let Err(e) = logging::init_logging(options.debug) {
        eprintln!("{e}");
    }

    let code = run(options).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    code
}

async fn run(options: InitOptions) -> ExitCode {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Failed to read the current directory: {e}");
            return ExitCode::FAILURE;
        }
    };
    let environment = InitEnvironment {
        cwd,
        interactive: std::io::stdin().is_terminal(),
    };

    let prompter: Arc<dyn Prompter> = Arc::new(CliclackPrompter::new());
    let reporter = ConsoleReporter::new(options.debug);
    let templates = TemplateRoot::resolve(options.template_dir.as_deref());
    tracing::debug!(templates = %templates.path().display(), "template root");

    let host_prompter = environment.interactive.then(|| prompter.clone());
    let toolchain = Toolchain::standard(templates, PackageManager::detect(), host_prompter);

    match run_init(&options, &environment, prompter.as_ref(), &toolchain, &reporter).await {
        Ok(InitOutcome::Completed(_)) | Ok(InitOutcome::Cancelled) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.error(&e.to_string());
            if let Some(suggestion) = e.suggestion() {
                reporter.info(suggestion);
            }
            ExitCode::FAILURE
        }
    }
}
