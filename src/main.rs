use clap::Parser;
use garden_planner::catalog;
use garden_planner::render;
use garden_planner::solver::{Packing, SearchOutcome, Solver};
use garden_planner::types::{Crop, PackingResult, PlannerConfig};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "garden_planner",
    about = "Scale a planting list as far as it will go and pack it into garden rows"
)]
struct Cli {
    /// JSON file with the crop list (default: built-in per-person list)
    #[arg(long)]
    crops: Option<std::path::PathBuf>,

    /// Number of rows
    #[arg(long, default_value_t = 12)]
    rows: usize,

    /// Row length in inches
    #[arg(long, default_value_t = 360)]
    row_length: u32,

    /// Bed width in inches
    #[arg(long, default_value_t = 36)]
    bed_width: u32,

    /// Stop bisecting once the multiplier interval is narrower than this
    #[arg(long, default_value_t = 1e-9)]
    tolerance: f64,

    /// Maximum bisection steps
    #[arg(long, default_value_t = 60)]
    max_iterations: u32,

    /// Evaluate one multiplier instead of searching for the largest
    #[arg(long, value_parser = parse_multiplier)]
    multiplier: Option<f64>,

    /// Pack with best-fit decreasing instead of exact search (needs --multiplier)
    #[arg(long, requires = "multiplier")]
    greedy: bool,

    /// Show ASCII layout of the rows
    #[arg(long)]
    layout: bool,

    /// Write the row assignment as CSV to this file
    #[arg(long)]
    csv: Option<std::path::PathBuf>,

    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_multiplier(s: &str) -> Result<f64, String> {
    let x = s
        .parse::<f64>()
        .map_err(|_| format!("invalid multiplier '{}'", s))?;
    if !x.is_finite() || x < 0.0 {
        return Err(format!("multiplier must be a non-negative number, got '{}'", s));
    }
    Ok(x)
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let crops = match &cli.crops {
        Some(path) => catalog::load_crops(path).unwrap_or_else(|e| fail(e)),
        None => catalog::baseline_crops(),
    };

    let config = PlannerConfig {
        rows: cli.rows,
        row_length: cli.row_length,
        bed_width: cli.bed_width,
        tolerance: cli.tolerance,
        max_iterations: cli.max_iterations,
        ..PlannerConfig::default()
    };

    let solver = Solver::new(crops, config).unwrap_or_else(|e| fail(e));

    let result = match cli.multiplier {
        Some(x) => {
            let packing = if cli.greedy {
                Packing::BestFit
            } else {
                Packing::Exact
            };
            let result = solver
                .counts_at(x)
                .and_then(|counts| solver.evaluate_counts_with(&counts, packing))
                .unwrap_or_else(|reason| fail(format!("infeasible at x = {}: {}", x, reason)));
            if cli.json {
                println!("{}", to_json(&result));
            } else {
                println!("Multiplier x = {}", x);
                print_result(&solver, &result);
            }
            result
        }
        None => {
            let outcome = solver.solve().unwrap_or_else(|e| fail(e));
            if cli.json {
                println!("{}", to_json(&outcome));
            } else {
                print_outcome(&solver, &outcome);
            }
            outcome.result
        }
    };

    if cli.layout && !cli.json {
        print!("{}", render::render_rows(&result));
    }

    if let Some(path) = &cli.csv {
        std::fs::write(path, render::to_csv(&result))
            .unwrap_or_else(|e| fail(format!("could not write {}: {}", path.display(), e)));
        eprintln!("Wrote {}", path.display());
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn print_outcome(solver: &Solver, outcome: &SearchOutcome) {
    let config = solver.config();
    println!(
        "Rows: {}, Row length: {} in, Capacity: {} in",
        config.rows,
        config.row_length,
        config.capacity()
    );
    match outcome.boundary {
        Some(ratio) => println!("Final multiplier x = {:.12} ({})", outcome.multiplier, ratio),
        None => println!("Final multiplier x = {:.12}", outcome.multiplier),
    }
    println!("Search trials: {}", outcome.trials);
    print_result(solver, &outcome.result);
}

fn print_result(solver: &Solver, result: &PackingResult) {
    println!(
        "Total used length = {} in of {} in; waste = {} in ({:.1}%)",
        result.total_length,
        result.capacity(),
        result.waste,
        result.waste_percent()
    );

    println!("\nScaled counts (per crop):");
    for Crop {
        name,
        spacing,
        trellised,
        ..
    } in solver.crops()
    {
        let count = result.scaled_counts.get(name).copied().unwrap_or(0);
        println!(
            " - {:30} -> {:4} plants; spacing={:3} in; trellised={}",
            name, count, spacing, trellised
        );
    }

    println!("\nPiece breakdown:");
    for piece in &result.pieces {
        println!(" - {:30} : {} in", piece.label, piece.length);
    }

    println!("\nRow-by-row assignment:\n");
    for (i, row) in result.rows.iter().enumerate() {
        println!(
            "Row {} : used {} in, remaining {} in",
            i + 1,
            row.used(),
            row.remaining(result.row_length)
        );
        for piece in &row.pieces {
            println!("    {} - {} in", piece.label, piece.length);
        }
        println!();
    }
}
