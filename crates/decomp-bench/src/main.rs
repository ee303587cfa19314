mod cli;
mod json_output;
mod report;
mod runner;

use clap::Parser;
use mpi::traits::*;

use cli::CliArgs;

fn main() {
    let universe = mpi::initialize().unwrap();
    let world = universe.world();
    let rank = world.rank();
    let group_size = world.size();

    let args = CliArgs::parse();

    let json_stdout = args.json;
    let json_file = args.json_file.clone();
    let json_mode = json_stdout || json_file.is_some();
    let print_text = !json_stdout;

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let n_global = args.resolve_n_global(group_size);

    if rank == 0 && print_text {
        println!("decomp-bench (Rust decomposition exchange benchmark)");
        println!("  num_tasks      = {}", group_size);
        println!("  n_global       = {}", n_global);
        println!("  num_io_tasks   = {}", args.num_io_tasks);
        println!("  io_stride      = {}", args.io_stride);
        println!("  element_size   = {}", args.element_size);
        println!("  repetitions    = {}", args.repetitions);
        println!("  check          = {}", args.check);
    }

    let result = runner::run_benchmark(
        &world,
        n_global,
        args.num_io_tasks,
        args.io_stride,
        args.element_size,
        args.repetitions,
        args.check,
        print_text,
    );

    match result {
        Ok(bench_results) => {
            if rank == 0 && json_mode {
                let doc = json_output::build_json_document(
                    n_global,
                    args.num_io_tasks,
                    args.io_stride,
                    args.element_size,
                    args.repetitions,
                    group_size,
                    &bench_results,
                    &command_line,
                );
                let json_str =
                    serde_json::to_string_pretty(&doc).expect("failed to serialize JSON");

                if json_stdout {
                    println!("{}", json_str);
                }

                if let Some(ref path) = json_file {
                    std::fs::write(path, &json_str)
                        .unwrap_or_else(|e| eprintln!("ERROR: failed to write JSON file: {}", e));
                }
            }

            if bench_results.check_errors > 0 {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("ERROR [rank {}]: {}", rank, e);
            world.barrier();
            std::process::exit(1);
        }
    }

    world.barrier();
    // MPI_Finalize happens on drop of `universe`
}
