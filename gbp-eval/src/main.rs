use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use gbp::io::{Format, json, read_instance, write_instance};
use gbp::util::generator::InstanceGenerator;
use gbp_eval::config::EvalConfig;
use gbp_eval::evaluation::ErrorReport;
use gbp_eval::io::cli::{Cli, Command, GenerateArgs, SolveArgs};
use gbp_eval::io::output::SolveOutput;
use gbp_eval::io::report::{write_csv, write_table};
use gbp_eval::multi_path_runner::MultiPathRunner;
use gbp_eval::path_runner::PathRunner;
use gbp_eval::suite::EvalSuite;
use gbp_eval::{EPOCH, io};
use gbp_heur::opt::never_cancelled;
use log::{info, warn};
use thousands::Separable;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let mut config = match &args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            EvalConfig::default()
        }
        Some(config_file) => {
            let file = File::open(config_file)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).context("incorrect config file format")?
        }
    };
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(oplrun) = &args.oplrun {
        config.reference_binary = oplrun.clone();
    }
    if let Some(max_procs) = args.max_procs {
        config.max_reference_procs = Some(max_procs);
    }
    config.verbose |= args.verbose;
    info!("[MAIN] Successfully parsed EvalConfig: {config:?}");

    match &args.command {
        Command::Generate(gen_args) => return generate(gen_args),
        Command::Solve(solve_args) => return solve(solve_args),
        _ => {}
    }
    let target = args
        .command
        .target()
        .context("command does not evaluate any data")?;
    let heuristics = args
        .command
        .heuristics()
        .unwrap_or_else(|| config.heuristics.clone());

    let suite = EvalSuite::from_config(&config, target.model_file.clone(), &heuristics)?;
    let reference_id = suite.reference_id().to_string();
    info!(
        "[MAIN] evaluating {} heuristics against {reference_id} on {} paths",
        suite.heuristics().len(),
        target.data_paths.len()
    );

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone())?;

    let runner = MultiPathRunner::new(PathRunner::new(Arc::new(suite)));
    let results = runner.run(target.data_paths.clone(), cancel).await?;

    let n_objectives: usize = results
        .values()
        .flat_map(|files| files.values())
        .map(|objectives| objectives.len())
        .sum();
    info!(
        "[MAIN] collected {} objectives in {}ms",
        n_objectives.separate_with_commas(),
        EPOCH.elapsed().as_millis().separate_with_commas()
    );

    let report = ErrorReport::compute(&results, &reference_id);
    write_table(&report, config.verbose, std::io::stdout().lock())?;
    if let Some(output) = &args.output {
        let file = File::create(output)
            .with_context(|| format!("could not create {}", output.display()))?;
        write_csv(&report, BufWriter::new(file))?;
        info!("[MAIN] errors written to {}", output.display());
    }
    Ok(())
}

fn solve(args: &SolveArgs) -> Result<()> {
    let format = Format::from_path(&args.instance)?;
    let instance = read_instance(&args.instance, format)?;
    let heuristic = args.heuristic.build()?;

    let result = heuristic.optimize(&instance, &never_cancelled)?;
    info!(
        "[MAIN] {} used {} of {} bins",
        heuristic.identifier(),
        result.bins_used,
        instance.n_bins()
    );

    let output = SolveOutput {
        instance: json::export(&instance),
        result: json::export_result(&result),
        heuristic: heuristic.identifier().to_string(),
    };
    match &args.solution_file {
        Some(path) => io::write_json(&output, path)?,
        None => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(())
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let generator = InstanceGenerator {
        n_bins: args.bins,
        n_items: args.items,
        capacity_range: args.min_capacity..=args.max_capacity,
        size_range: args.min_size..=args.max_size,
    };
    let format = Format::from(args.format);
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("could not create {}", args.out_dir.display()))?;

    for i in 0..args.count {
        let instance = generator.generate(args.seed + i as u64)?;
        let path = args
            .out_dir
            .join(format!("instance_{i:03}.{}", format.extension()));
        write_instance(&instance, &path, format)?;
    }
    info!(
        "[MAIN] generated {} instances in {}",
        args.count.separate_with_commas(),
        args.out_dir.display()
    );
    Ok(())
}

/// Cancels `cancel` on the first SIGTERM or SIGINT
#[cfg(unix)]
fn spawn_signal_handler(cancel: CancellationToken) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("Failed to register SIGINT handler")?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("[MAIN] Received SIGTERM, cancelling evaluation..."),
            _ = sigint.recv() => info!("[MAIN] Received SIGINT, cancelling evaluation..."),
            _ = cancel.cancelled() => return,
        }
        cancel.cancel();
    });
    Ok(())
}

#[cfg(not(unix))]
fn spawn_signal_handler(cancel: CancellationToken) -> Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("[MAIN] Received Ctrl-C, cancelling evaluation...");
            cancel.cancel();
        }
    });
    Ok(())
}
