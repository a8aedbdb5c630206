mod config;
mod diagnostics;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use cfb::{Category, Document, InstructionKind, SAMPLES, Sample};

use crate::config::Settings;
use crate::diagnostics::Reporter;

const SUBCOMMANDS: &[&str] = &[
    "render", "check", "kinds", "sample", "runtime", "advice", "test", "help",
];

#[derive(Parser)]
#[command(name = "cfb", version, about = "Container build-file builder and linter")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Settings file (defaults to <config dir>/cfb/settings.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug events to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the build file generated from a canvas
    Render(RenderArgs),

    /// Validate a canvas and report errors and warnings
    Check(CheckArgs),

    /// List the supported instructions and their fields
    Kinds(KindsArgs),

    /// List the bundled samples, or print one
    Sample(SampleArgs),

    /// Show or change the preferred container runtime
    Runtime(RuntimeArgs),

    /// Show the runtime-specific tip for an instruction
    Advice(AdviceArgs),

    /// Run .test.md golden files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Markdown canvas file
    file: PathBuf,

    /// Write the build file here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Markdown canvas file
    file: PathBuf,

    /// Fail on warnings as well as errors
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(clap::Args)]
struct KindsArgs {
    /// Only list one category (basic, file, exec, other)
    #[arg(short, long)]
    category: Option<Category>,
}

#[derive(clap::Args)]
struct SampleArgs {
    /// Sample to print; lists all samples when omitted
    name: Option<String>,

    /// Print the generated build file instead of the canvas
    #[arg(long)]
    render: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RuntimeChoice {
    Podman,
    Docker,
    Toggle,
}

#[derive(clap::Args)]
struct RuntimeArgs {
    /// New preference; shows the current one when omitted
    choice: Option<RuntimeChoice>,
}

#[derive(clap::Args)]
struct AdviceArgs {
    /// Instruction keyword, e.g. EXPOSE
    kind: InstructionKind,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: PathBuf,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() -> ExitCode {
    // `cfb canvas.md` is shorthand for `cfb render canvas.md`.
    let mut args: Vec<String> = std::env::args().collect();
    let first_pos = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(i, a)| !a.starts_with('-') && args[i - 1] != "--config")
        .map(|(i, a)| (i, a.clone()));
    if let Some((pos, first)) = first_pos {
        if !SUBCOMMANDS.contains(&first.as_str()) {
            args.insert(pos, "render".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings_path = cli.config.clone().or_else(config::default_path);

    match cli.command {
        Command::Render(args) => do_render(args, cli.no_color),
        Command::Check(args) => do_check(args, cli.no_color),
        Command::Kinds(args) => {
            do_kinds(args);
            Ok(ExitCode::SUCCESS)
        }
        Command::Sample(args) => do_sample(args),
        Command::Runtime(args) => do_runtime(args, settings_path.as_deref()),
        Command::Advice(args) => do_advice(args, settings_path.as_deref()),
        Command::Test(args) => {
            if args.list_categories {
                test_runner::list_categories(&args.path);
                return Ok(ExitCode::SUCCESS);
            }
            let code = test_runner::run_tests(&args.path, cli.no_color, &args.category);
            Ok(if code == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Read and parse a canvas, reporting diagnostics. `None` means parsing
/// failed and the errors were already shown.
fn load_canvas(path: &Path, reporter: &mut Reporter) -> Result<Option<Document>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    let file_id = reporter.add_file(path.display().to_string(), source.clone());

    match cfb::parser::Parser::new(source, file_id).parse() {
        Ok((document, warnings)) => {
            reporter.emit_parse_errors(&warnings);
            Ok(Some(document))
        }
        Err(errors) => {
            reporter.emit_parse_errors(&errors);
            Ok(None)
        }
    }
}

fn do_render(args: RenderArgs, no_color: bool) -> Result<ExitCode> {
    let mut reporter = Reporter::new(no_color);
    let Some(document) = load_canvas(&args.file, &mut reporter)? else {
        return Ok(ExitCode::FAILURE);
    };
    if !document.has_base_image() {
        tracing::warn!("canvas has no FROM instruction yet");
    }

    let text = document.render();
    match args.output {
        Some(output) => {
            std::fs::write(&output, text)
                .with_context(|| format!("cannot write '{}'", output.display()))?;
            eprintln!("wrote {}", output.display());
        }
        None => print!("{}", text),
    }
    Ok(ExitCode::SUCCESS)
}

fn do_check(args: CheckArgs, no_color: bool) -> Result<ExitCode> {
    let mut reporter = Reporter::new(no_color);
    let Some(document) = load_canvas(&args.file, &mut reporter)? else {
        return Ok(ExitCode::FAILURE);
    };

    let report = validator::validate_document(&document);
    reporter.emit_report(&report, document.source_id);

    if report.is_empty() {
        eprintln!("ok: {} has no problems", args.file.display());
    } else {
        eprintln!(
            "{}: {} error(s), {} warning(s)",
            args.file.display(),
            report.errors.len(),
            report.warnings.len()
        );
    }

    let failed = !report.is_valid() || (args.deny_warnings && !report.warnings.is_empty());
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn do_kinds(args: KindsArgs) {
    let categories: Vec<Category> = match args.category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    for category in categories {
        println!("[{}]", category);
        for kind in category.kinds() {
            println!("  {:<11} {}", kind.keyword(), kind.description());
            for field in kind.fields() {
                let marker = if field.required { "*" } else { " " };
                let example = field
                    .placeholder
                    .map(|p| format!("  e.g. {}", p))
                    .unwrap_or_default();
                println!("      {}{:<9} {}{}", field.name, marker, field.label, example);
            }
        }
    }
}

fn do_sample(args: SampleArgs) -> Result<ExitCode> {
    let Some(name) = args.name else {
        for sample in SAMPLES {
            println!(
                "{:<11} {:<4} {} - {}",
                sample.key,
                sample.level.stars(),
                sample.name,
                sample.description
            );
        }
        return Ok(ExitCode::SUCCESS);
    };

    let Some(sample) = Sample::find(&name) else {
        let known: Vec<&str> = SAMPLES.iter().map(|s| s.key).collect();
        bail!("unknown sample '{}' (available: {})", name, known.join(", "));
    };

    let document = sample.load();
    if args.render {
        print!("{}", document.render());
    } else {
        print!("{}", document.to_canvas());
    }
    Ok(ExitCode::SUCCESS)
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path),
        None => Ok(Settings::default()),
    }
}

fn do_runtime(args: RuntimeArgs, path: Option<&Path>) -> Result<ExitCode> {
    let mut settings = load_settings(path)?;

    if let Some(choice) = args.choice {
        settings.runtime = match choice {
            RuntimeChoice::Podman => cfb::ContainerRuntime::Podman,
            RuntimeChoice::Docker => cfb::ContainerRuntime::Docker,
            RuntimeChoice::Toggle => settings.runtime.toggle(),
        };
        let Some(path) = path else {
            bail!("no config directory available; pass --config to choose a settings file");
        };
        settings.save(path)?;
    }

    println!("runtime: {}", settings.runtime);
    println!();
    println!("{}", settings.runtime.build_run_commands());
    Ok(ExitCode::SUCCESS)
}

fn do_advice(args: AdviceArgs, path: Option<&Path>) -> Result<ExitCode> {
    let settings = load_settings(path)?;
    match settings.runtime.advice(args.kind) {
        Some(tip) => println!("{} ({}): {}", args.kind, settings.runtime, tip),
        None => println!(
            "no {}-specific advice for {}",
            settings.runtime, args.kind
        ),
    }
    Ok(ExitCode::SUCCESS)
}
