use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cf_app::{
    AppResult, RunProgressEvent, RunReport, RunRequest, RunStage, predict_recipe,
    project_service, query, report, run_service,
};
use cf_core::{format_hms, s, to_degc};
use cf_recipe::{Prediction, PredictionRequest};
use cf_sim::ProcessParameters;
use tracing::debug;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(
    about = "carbflow CLI - gas carburizing cycle simulation and recipe prediction",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and values
    Validate {
        /// Path to the case file (YAML or JSON)
        case_file: PathBuf,
    },
    /// List cases in a case file
    Cases {
        /// Path to the case file (YAML or JSON)
        case_file: PathBuf,
    },
    /// Run one case of a case file
    Run {
        /// Path to the case file (YAML or JSON)
        case_file: PathBuf,
        /// Case ID to simulate
        case_id: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run every case of a case file in parallel
    RunAll {
        /// Path to the case file (YAML or JSON)
        case_file: PathBuf,
    },
    /// Run an ad-hoc simulation from flags
    Simulate {
        #[command(flatten)]
        process: ProcessArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Predict a recipe for a hardness and depth target
    Predict {
        #[command(flatten)]
        request: PredictArgs,
        /// Linear model coefficients (JSON); the simulator baseline is used
        /// when omitted
        #[arg(long)]
        model: Option<PathBuf>,
        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Print the full report as JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Write the full report to a file (.json, .yaml or .yml)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ProcessArgs {
    /// Treatment temperature (°C)
    #[arg(long, default_value_t = 950.0)]
    temperature: f64,
    /// Carbon flow during carburizing (%)
    #[arg(long, default_value_t = 14.0)]
    carbon_flow: f64,
    /// Surface carbon that ends carburizing (%)
    #[arg(long, default_value_t = 1.8)]
    carbon_max: f64,
    /// Surface carbon that ends diffusion (%)
    #[arg(long, default_value_t = 1.0)]
    carbon_min: f64,
    /// Surface carbon that ends the final hold (%)
    #[arg(long, default_value_t = 0.7)]
    carbon_final: f64,
    /// Target case depth (mm)
    #[arg(long, default_value_t = 2.1)]
    target_depth: f64,
    /// Carbon content defining the case depth (%)
    #[arg(long, default_value_t = 0.36)]
    eff_carbon: f64,
    /// Core carbon of the steel (%)
    #[arg(long, default_value_t = 0.2)]
    initial_carbon: f64,
}

impl From<ProcessArgs> for ProcessParameters {
    fn from(a: ProcessArgs) -> Self {
        ProcessParameters {
            temperature: a.temperature,
            carbon_flow: a.carbon_flow,
            carbon_max: a.carbon_max,
            carbon_min: a.carbon_min,
            carbon_final: a.carbon_final,
            target_depth: a.target_depth,
            eff_carbon: a.eff_carbon,
            initial_carbon: a.initial_carbon,
        }
    }
}

#[derive(Args)]
struct PredictArgs {
    /// Target surface hardness (HV)
    #[arg(long)]
    hardness: f64,
    /// Target case depth (mm)
    #[arg(long)]
    target_depth: f64,
    /// Furnace load weight (kg)
    #[arg(long, default_value_t = 0.0)]
    load_weight: f64,
    /// Part weight (kg)
    #[arg(long, default_value_t = 0.0)]
    weight: f64,
    /// Part weight is not known
    #[arg(long)]
    weight_unknown: bool,
    /// Recipe temperature (°C)
    #[arg(long, default_value_t = 950.0)]
    temperature: f64,
    /// Recipe carbon ceiling (%)
    #[arg(long, default_value_t = 1.8)]
    carbon_max: f64,
    /// Recipe carbon flow (%)
    #[arg(long, default_value_t = 14.0)]
    carbon_flow: f64,
    /// Core carbon of the steel (%)
    #[arg(long, default_value_t = 0.2)]
    carbon: f64,
}

impl From<PredictArgs> for PredictionRequest {
    fn from(a: PredictArgs) -> Self {
        PredictionRequest {
            hardness_value: a.hardness,
            target_depth: a.target_depth,
            load_weight: a.load_weight,
            weight: a.weight,
            is_weight_unknown: a.weight_unknown,
            recipe_temperature: a.temperature,
            recipe_carbon_max: a.carbon_max,
            recipe_carbon_flow: a.carbon_flow,
            carbon_percentage: a.carbon,
        }
    }
}

fn main() -> AppResult<()> {
    // Initialize tracing; RUST_LOG selects the level
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_file } => cmd_validate(&case_file),
        Commands::Cases { case_file } => cmd_cases(&case_file),
        Commands::Run {
            case_file,
            case_id,
            output,
        } => cmd_run(&case_file, &case_id, &output),
        Commands::RunAll { case_file } => cmd_run_all(&case_file),
        Commands::Simulate { process, output } => cmd_simulate(process.into(), &output),
        Commands::Predict {
            request,
            model,
            json,
        } => cmd_predict(&request.into(), model.as_deref(), json),
    }
}

fn cmd_validate(case_file: &Path) -> AppResult<()> {
    println!("Validating case file: {}", case_file.display());
    let file = project_service::load_case_file(case_file)?;
    let warnings = project_service::validate_case_file(&file)?;
    for warning in &warnings {
        println!("  warning: {}", warning);
    }
    println!("✓ Case file is valid ({} cases)", file.cases.len());
    Ok(())
}

fn cmd_cases(case_file: &Path) -> AppResult<()> {
    let file = project_service::load_case_file(case_file)?;
    let cases = project_service::list_cases(&file);

    if cases.is_empty() {
        println!("No cases found in case file");
    } else {
        println!("Cases in '{}':", file.name);
        for case in cases {
            let depth = case
                .target_depth_mm
                .map(|d| format!("{} mm", d))
                .unwrap_or_else(|| "default depth".to_string());
            let hardness = case
                .hardness_value
                .map(|h| format!(", {} HV", h))
                .unwrap_or_default();
            println!("  {} - {} ({}{})", case.id, case.name, depth, hardness);
        }
    }
    Ok(())
}

fn cmd_run(case_file: &Path, case_id: &str, output: &OutputArgs) -> AppResult<()> {
    let request = RunRequest {
        case_file_path: case_file,
        case_id,
    };

    let report = if output.json {
        run_service::run_case(&request)?
    } else {
        println!("Running case: {}", case_id);
        let mut last_emit = Instant::now();
        let mut last_stage = None;
        let report = run_service::run_case_with_progress(
            &request,
            Some(&mut |event| {
                let emit_now = last_stage != Some(event.stage)
                    || event.cycle.is_some()
                    || last_emit.elapsed().as_millis() >= 100;
                if emit_now {
                    render_cli_progress(&event);
                    last_stage = Some(event.stage);
                    last_emit = Instant::now();
                }
            }),
        )?;
        clear_progress_line();
        report
    };

    finish_report(&report, output)
}

fn cmd_simulate(params: ProcessParameters, output: &OutputArgs) -> AppResult<()> {
    let report = if output.json {
        run_service::run_parameters(&params, None)?
    } else {
        println!("Running ad-hoc simulation");
        let report = run_service::run_parameters(
            &params,
            Some(&mut |event| {
                if event.cycle.is_some() {
                    render_cli_progress(&event);
                }
            }),
        )?;
        clear_progress_line();
        report
    };

    finish_report(&report, output)
}

fn cmd_run_all(case_file: &Path) -> AppResult<()> {
    let started = Instant::now();
    let outcomes = run_service::run_all_cases(case_file)?;

    println!(
        "Ran {} cases in {:.2}s:",
        outcomes.len(),
        started.elapsed().as_secs_f64()
    );
    for outcome in outcomes {
        match outcome.result {
            Ok(report) => {
                let summary = &report.summary;
                println!(
                    "  ✓ {:<16} cycles={:<3} depth={:.3} mm  carb={}  diff={}  total={}",
                    outcome.case_id,
                    summary.cycles,
                    summary.final_depth_mm.unwrap_or(0.0),
                    summary.total_carb_hms(),
                    summary.total_diff_hms(),
                    summary.total_time_hms()
                );
            }
            Err(err) => println!("  ✗ {:<16} {}", outcome.case_id, err),
        }
    }
    Ok(())
}

fn cmd_predict(request: &PredictionRequest, model: Option<&Path>, json: bool) -> AppResult<()> {
    let prediction = predict_recipe(request, model)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        print_prediction(&prediction);
    }
    Ok(())
}

fn finish_report(report: &RunReport, output: &OutputArgs) -> AppResult<()> {
    if let Some(path) = &output.output {
        report::write_report(path, report)?;
        debug!(path = %path.display(), run_id = %report.run_id, "report written");
        if !output.json {
            println!("✓ Report written to {}", path.display());
        }
    }

    if output.json {
        println!("{}", report::report_to_json(report)?);
    } else {
        print_report(report);
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.cycle) {
        (RunStage::Simulating, Some(c)) => {
            let width = 28usize;
            let filled = ((c.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  cycle={}  depth={:.3}/{:.3} mm  t={}  elapsed={:.1}s",
                bar,
                c.fraction_complete * 100.0,
                c.cycle,
                c.depth_mm,
                c.target_depth_mm,
                format_hms(s(c.sim_time_s as f64)),
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_report(report: &RunReport) {
    let summary = &report.summary;
    println!("✓ Simulation completed: {}", report.run_id);
    if let Some(name) = &report.case_name {
        println!("  Case: {}", name);
    }
    println!(
        "  Temperature: {:.0} °C",
        to_degc(report.parameters.treatment_temperature())
    );
    println!(
        "  Stop: {:?}, depth threshold {} % ({:?})",
        report.stop_reason, report.parameters.eff_carbon, report.threshold
    );

    println!("\n  cycle   carb(s)   diff(s)  final(s)  depth(mm)  surface(%)");
    for row in query::cycle_rows(report) {
        println!(
            "  {:>5} {:>9} {:>9} {:>9} {:>10.4} {:>11.4}{}",
            row.cycle,
            row.carb_s,
            row.diff_s,
            row.final_s,
            row.depth_mm,
            row.surface_carbon,
            if row.truncated { "  (truncated)" } else { "" }
        );
    }

    println!("\nSummary:");
    println!("  Cycles:         {}", summary.cycles);
    println!("  Carburizing:    {}", summary.total_carb_hms());
    println!("  Diffusion:      {}", summary.total_diff_hms());
    println!("  Total:          {}", summary.total_time_hms());
    if let Some(depth) = summary.final_depth_mm {
        println!("  Final depth:    {:.4} mm", depth);
    }
    if summary.truncated {
        println!("  Warning: a phase hit a safety limit, phase times are partial");
    }
    if summary.degenerate_depth {
        println!("  Warning: depth could not be interpolated in some cycles");
    }
}

fn print_prediction(prediction: &Prediction) {
    let sim = &prediction.simulated;
    println!(
        "Simulated: {} cycles, first {}s/{}s, last {}s/{}s, final hold {}s",
        sim.num_cycles,
        sim.first_carb,
        sim.first_diff,
        sim.last_carb,
        sim.last_diff,
        sim.final_time
    );

    if prediction.recipe.is_empty() {
        println!("Predicted recipe is empty (cycle count rounds to zero)");
        return;
    }

    println!("\nPredicted recipe:");
    println!("  cycle   carb(s)   diff(s)  final(s)");
    for (i, step) in prediction.recipe.iter().enumerate() {
        let final_s = step
            .final_seconds
            .map(|f| f.to_string())
            .unwrap_or_default();
        println!(
            "  {:>5} {:>9} {:>9} {:>9}",
            i + 1,
            step.carb_seconds,
            step.diff_seconds,
            final_s
        );
    }

    let carb: u64 = prediction.recipe.iter().map(|r| r.carb_seconds).sum();
    let diff: u64 = prediction
        .recipe
        .iter()
        .map(|r| r.diff_seconds + r.final_seconds.unwrap_or(0))
        .sum();
    println!(
        "\n  Carburizing {}  Diffusion {}",
        format_hms(s(carb as f64)),
        format_hms(s(diff as f64))
    );
}
