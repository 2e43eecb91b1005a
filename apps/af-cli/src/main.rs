mod error;
mod scenario;

use clap::{Parser, Subcommand};
use error::CliResult;
use scenario::Scenario;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "af-cli")]
#[command(about = "Autonomous float simulator - vertical dynamics and depth control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a scenario file and print the float it describes
    Show {
        /// Path to the scenario YAML file
        scenario: PathBuf,
    },
    /// Time step a scenario
    Run {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Write the trajectory log as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write the trajectory log as JSON lines
        #[arg(long)]
        jsonl: Option<PathBuf>,
    },
    /// Force and speed envelope over a depth range
    Bounds {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Deepest depth (m, negative down)
        #[arg(long, allow_hyphen_values = true)]
        z_min: f64,
        /// Shallowest depth (m)
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        z_max: f64,
    },
    /// Added volume that makes the float neutral at a depth
    Equilibrium {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Depth (m, negative down)
        #[arg(long, allow_hyphen_values = true)]
        z: f64,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { scenario } => cmd_show(&scenario),
        Commands::Run {
            scenario,
            csv,
            jsonl,
        } => cmd_run(&scenario, csv.as_deref(), jsonl.as_deref()),
        Commands::Bounds {
            scenario,
            z_min,
            z_max,
        } => cmd_bounds(&scenario, z_min, z_max),
        Commands::Equilibrium { scenario, z } => cmd_equilibrium(&scenario, z),
    }
}

fn cmd_show(path: &Path) -> CliResult<()> {
    let scenario = Scenario::load(path)?;
    let water = scenario.build_water()?;
    let float = scenario.build_float(&water)?;
    print!("{float}");
    println!("{}", serde_json::to_string_pretty(&scenario)?);
    Ok(())
}

fn cmd_run(path: &Path, csv: Option<&Path>, jsonl: Option<&Path>) -> CliResult<()> {
    let scenario = Scenario::load(path)?;
    let mut water = scenario.build_water()?;
    let mut float = scenario.build_float(&water)?;
    let summary = float.time_step(&mut water, &scenario.time_step_options())?;

    println!("Run finished after {} steps (t = {:.1} s)", summary.steps, summary.t_end);
    println!("  z = {:.3} m", summary.z);
    println!("  w = {:.4} m/s", summary.w);
    println!("  v = {:.3e} m^3", summary.v);
    println!("  control updates: {}", summary.control_updates);
    println!("  samples stored:  {}", summary.samples_stored);

    if let Some(log) = float.log() {
        if let Some(out) = csv {
            log.write_csv(BufWriter::new(File::create(out)?))?;
            println!("Wrote {} samples to {}", log.len(), out.display());
        }
        if let Some(out) = jsonl {
            log.write_jsonl(BufWriter::new(File::create(out)?))?;
            println!("Wrote {} samples to {}", log.len(), out.display());
        }
    }
    Ok(())
}

fn cmd_bounds(path: &Path, z_min: f64, z_max: f64) -> CliResult<()> {
    let scenario = Scenario::load(path)?;
    let water = scenario.build_water()?;
    let float = scenario.build_float(&water)?;
    let bounds = float.compute_bounds(&water, z_min, z_max, scenario.run.lv);

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Bounds between {z_min} m and {z_max} m:")?;
    writeln!(stdout, "  f_max     = {:.4} N", bounds.f_max)?;
    writeln!(stdout, "  f_min     = {:.4} N", bounds.f_min)?;
    writeln!(stdout, "  |f|_max   = {:.4} N", bounds.f_abs_max)?;
    writeln!(stdout, "  w_max     = {:.2} cm/s", bounds.w_max * 100.0)?;
    Ok(())
}

fn cmd_equilibrium(path: &Path, z: f64) -> CliResult<()> {
    let scenario = Scenario::load(path)?;
    let water = scenario.build_water()?;
    let float = scenario.build_float(&water)?;
    let v = float.volume_for_equilibrium(water.get_p(z), water.get_temp(z), water.get_rho(z, false))?;
    println!("Equilibrium at z = {z} m: v = {:.3} cm^3", v * 1e6);
    if let Some(piston) = float.piston() {
        let (vol_min, vol_max) = (piston.vol_min(), piston.vol_max());
        if v < vol_min || v > vol_max {
            println!(
                "  outside the piston range [{:.3}, {:.3}] cm^3",
                vol_min * 1e6,
                vol_max * 1e6
            );
        } else {
            println!("  piston displacement d = {:.4} m", piston.vol2d(v));
        }
    }
    Ok(())
}
