use std::path::PathBuf;
use std::process::ExitCode;

use buildcfg::{DecisionTable, Document, ProjectFilter};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Query build and test configuration
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Top-level config file
    #[arg(long, env = "BUILDCFG_FILE", default_value = "build-config")]
    file: PathBuf,

    /// Log config loading and rule application
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List project names
    Projects(ProjectsArgs),
    /// Dump every project with its tests
    Config,
    /// Print projects in build order, dependencies first
    Order {
        #[arg(required = true)]
        projects: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct ProjectsArgs {
    /// List projects that have tests
    #[arg(long, conflicts_with = "without_tests")]
    with_tests: bool,

    /// List projects that don't have tests
    #[arg(long)]
    without_tests: bool,

    /// Include disabled projects
    #[arg(long, conflicts_with = "disabled")]
    all: bool,

    /// Only list disabled projects
    #[arg(long)]
    disabled: bool,
}

impl ProjectsArgs {
    fn filter(&self) -> ProjectFilter {
        let build = if self.all {
            None
        } else {
            Some(!self.disabled)
        };
        let have_tests = match (self.with_tests, self.without_tests) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        ProjectFilter::any().build(build).have_tests(have_tests)
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_config(table: &DecisionTable) {
    println!("Projects:");
    for (name, project) in table.iter() {
        println!("  {name}:");
        println!("    Build: {}", project.enabled);
        println!("    Tests:");
        for test in &project.host_tests {
            println!("      host: {test}");
        }
        for test in &project.unit_tests {
            println!("      unit: {test}");
        }
        if !project.also_build.is_empty() {
            println!("    Also build: {}", project.also_build.join(", "));
        }
    }

    for build in [true, false] {
        println!();
        println!("{}", if build { "Build:" } else { "Don't build:" });
        for tested in [true, false] {
            let filter = ProjectFilter::any()
                .build(Some(build))
                .have_tests(Some(tested));
            let names = table.projects(filter);
            for name in &names {
                println!("  {name}:");
                for test in table.lookup(name).tests() {
                    println!("    {test}");
                }
            }
            if !names.is_empty() && !tested {
                println!("    No tests");
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let doc = match Document::from_file(&cli.file) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let table = doc.resolve();
    tracing::debug!(%table, "resolved");

    match &cli.command {
        Command::Projects(args) => {
            for name in table.projects(args.filter()) {
                println!("{name}");
            }
        }
        Command::Config => print_config(&table),
        Command::Order { projects } => {
            for name in table.build_order(projects) {
                println!("{name}");
            }
        }
    }

    ExitCode::SUCCESS
}
