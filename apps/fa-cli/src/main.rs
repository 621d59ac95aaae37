use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fa_harness::run_audit;
use fa_scenario::{ScenarioError, compile_scenario, load_yaml};

#[derive(Parser)]
#[command(name = "fa-cli")]
#[command(about = "FlowAudit CLI - conservation audits for fluid network runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Run the conservation audit described by a scenario
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Write the JSON reports to this path (optional, defaults to none)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Audit error: {0}")]
    Audit(#[from] fa_harness::HarnessError),

    #[error("Failed to write report: {0}")]
    ReportWrite(#[from] std::io::Error),

    #[error("Report serialization error: {0}")]
    ReportJson(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            report,
        } => cmd_run(&scenario_path, report.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn cmd_validate(scenario_path: &Path) -> Result<ExitCode, AppError> {
    let scenario = load_yaml(scenario_path)?;
    println!(
        "OK: scenario '{}' ({} checkpoints, {} states)",
        scenario.name,
        scenario.checkpoints.len(),
        scenario.states.len()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_run(scenario_path: &Path, report_path: Option<&Path>) -> Result<ExitCode, AppError> {
    let scenario = load_yaml(scenario_path)?;
    let mut compiled = compile_scenario(&scenario)?;
    let summary = run_audit(&mut compiled.audit, &mut compiled.host)?;

    for report in &summary.reports {
        println!("{report}");
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&summary.reports)?;
        std::fs::write(path, json)?;
        println!("reports written to {}", path.display());
    }

    if summary.all_passed() {
        println!("audit '{}': PASS", summary.audit);
        Ok(ExitCode::SUCCESS)
    } else {
        let violations: usize = summary
            .reports
            .iter()
            .map(|r| r.violations().count())
            .sum();
        println!("audit '{}': FAIL ({violations} violation(s))", summary.audit);
        Ok(ExitCode::FAILURE)
    }
}
