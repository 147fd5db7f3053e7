use anyhow::Result;
use booktrends::cmd::{logging::init_logging, Args, Commands};
use booktrends::standalone::{engine::StageReport, pipeline};
use clap::Parser;

fn print_report(report: &StageReport) {
    println!(
        "{:<15} splits={:<6} map={:<10} shuffled={:<10} keys={}",
        report.workload,
        report.splits,
        report.map_records,
        report.shuffled_records,
        report.output_records
    );
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Run {
            input,
            output,
            options,
            args,
        } => {
            let report = pipeline::run(&input, &output, &options.config(args))?;
            report.stages.iter().for_each(print_report);
        }
        Commands::Submit {
            input,
            workload,
            output,
            options,
            args,
        } => {
            let report = pipeline::run_stage(&workload, &input, &output, &options.config(args))?;
            print_report(&report);
        }
    }
    Ok(())
}
