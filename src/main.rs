use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser};

use cmdvisor::{
    CommandRegistry, ExecutionContext, HandlerFn, RegistryError, Runner, RunnerConfig, Signal,
    SignalPolicy, Sink, VersionInfo,
};

const PRODUCT: &str = env!("CARGO_PKG_NAME");

/// Runs one named operation with leveled stderr and signal forwarding.
///
/// Diagnostics are controlled by `CMDVISOR_LOG` (TRACE, DEBUG, INFO, WARN, ERROR)
/// and `CMDVISOR_LOG_PATH`.
#[derive(Debug, Parser)]
#[command(name = "cmdvisor", disable_version_flag = true)]
struct Cli {
    /// Switch to a different working directory before executing the command.
    #[arg(long, value_name = "DIR")]
    chdir: Option<PathBuf>,

    /// Print the version and exit.
    #[arg(short = 'v', long)]
    version: bool,

    /// Operation to run (`version`, `echo`, `wait`).
    command: Option<String>,

    /// Arguments passed to the operation unchanged.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", VersionInfo::current(PRODUCT));
        return ExitCode::SUCCESS;
    }
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    };

    let registry = match registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut cfg = RunnerConfig::from_env(PRODUCT);
    cfg.signals = signal_policy();
    let runner = Runner::new(cfg, registry);

    let stderr = Sink::original_stderr().unwrap_or_else(|_| Sink::stderr());
    let code = runner
        .invoke(&command, cli.chdir, cli.args, Sink::stdout(), stderr)
        .await;

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[cfg(unix)]
fn signal_policy() -> SignalPolicy {
    SignalPolicy::new([Signal::Hangup], [Signal::Interrupt, Signal::Terminate])
        .unwrap_or_else(|_| SignalPolicy::forwarding([Signal::Interrupt, Signal::Terminate]))
}

#[cfg(not(unix))]
fn signal_policy() -> SignalPolicy {
    SignalPolicy::forwarding([Signal::Interrupt])
}

fn registry() -> Result<CommandRegistry, RegistryError> {
    CommandRegistry::builder()
        .register("version", |ctx: ExecutionContext| {
            HandlerFn::new(move |_args: Vec<String>| {
                let ui = ctx.ui().clone();
                async move {
                    ui.output(&VersionInfo::current(PRODUCT).to_string());
                    0
                }
            })
        })
        .register("echo", |ctx: ExecutionContext| {
            HandlerFn::new(move |args: Vec<String>| {
                let ui = ctx.ui().clone();
                async move {
                    eprintln!("[DEBUG] echo: {} argument(s)", args.len());
                    ui.output(&args.join(" "));
                    0
                }
            })
        })
        .register("wait", |ctx: ExecutionContext| {
            HandlerFn::new(move |args: Vec<String>| {
                let ctx = ctx.clone();
                async move { wait(&ctx, &args).await }
            })
        })
        .build()
}

async fn wait(ctx: &ExecutionContext, args: &[String]) -> i32 {
    let secs = match args.first().map(|s| s.parse::<u64>()) {
        None => 60,
        Some(Ok(secs)) => secs,
        Some(Err(_)) => {
            ctx.ui().error("usage: wait [SECONDS]");
            return 1;
        }
    };

    eprintln!("[INFO] waiting {secs}s");
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(secs)) => {
            ctx.ui().output("done");
            0
        }
        Some(()) = ctx.shutdown().recv() => {
            eprintln!("[WARN] shutdown requested");
            ctx.ui().warn("interrupted");
            130
        }
    }
}
