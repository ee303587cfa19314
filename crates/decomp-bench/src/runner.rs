use decomp_core::timer::BenchTimers;
use decomp_core::{create_decomp, now, transfer_field, DecompError, XferDirection};
use mpi::collective::SystemOperation;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::report;

/// Results from a complete benchmark run (all repetitions).
pub struct BenchmarkResults {
    pub iterations: Vec<report::IterResult>,
    pub check_errors: i64,
}

/// Assigns this rank a contiguous block of `[0, n_global)`; the
/// compute-side assignment is otherwise arbitrary, so a plain block
/// split exercises the general case without favoring any one policy.
fn synthetic_compute_ids(rank: i32, group_size: i32, n_global: i64) -> Vec<i64> {
    let base = n_global / group_size as i64;
    let remainder = n_global % group_size as i64;
    let (start, count) = if (rank as i64) < remainder {
        (rank as i64 * (base + 1), base + 1)
    } else {
        (remainder * (base + 1) + (rank as i64 - remainder) * base, base)
    };
    (start..start + count).collect()
}

/// Runs the full MPI-parallel decomposition benchmark loop: build the
/// decomposition once, then time `repetitions` round trips of
/// comp-to-io followed by io-to-comp transfers.
pub fn run_benchmark(
    comm: &SimpleCommunicator,
    n_global: i64,
    num_io_tasks: i32,
    io_stride: i32,
    element_size: usize,
    repetitions: i32,
    check: bool,
    print_text: bool,
) -> Result<BenchmarkResults, DecompError> {
    let rank = comm.rank();
    let group_size = comm.size();
    let compute_ids = synthetic_compute_ids(rank, group_size, n_global);

    if print_text {
        report::print_header(comm);
    }

    let mut iterations = Vec::new();
    let mut total_check_errors: i64 = 0;

    for rep in 0..repetitions {
        let mut timers = BenchTimers::default();

        timers.timers[decomp_core::timer::TIMER_CREATE_START] = now();
        let decomp = create_decomp(comm, compute_ids.len(), &compute_ids, num_io_tasks, io_stride)?;
        timers.timers[decomp_core::timer::TIMER_CREATE_STOP] = now();

        let mut comp_buf = vec![0u8; compute_ids.len() * element_size];
        fill_diagnostic_pattern(&mut comp_buf, element_size, rep, rank);

        let (io_start, io_count) = decomp.io_window();
        let mut io_buf = vec![0u8; io_count as usize * element_size];

        timers.timers[decomp_core::timer::TIMER_XFER_OUT_START] = now();
        transfer_field(
            comm,
            decomp.comp_list(),
            decomp.io_list(),
            XferDirection::CompToIo,
            element_size,
            &comp_buf,
            &mut io_buf,
        )?;
        timers.timers[decomp_core::timer::TIMER_XFER_OUT_STOP] = now();

        let mut round_trip_buf = vec![0u8; compute_ids.len() * element_size];

        timers.timers[decomp_core::timer::TIMER_XFER_IN_START] = now();
        transfer_field(
            comm,
            decomp.comp_list(),
            decomp.io_list(),
            XferDirection::IoToComp,
            element_size,
            &io_buf,
            &mut round_trip_buf,
        )?;
        timers.timers[decomp_core::timer::TIMER_XFER_IN_STOP] = now();

        if check {
            if round_trip_buf != comp_buf {
                total_check_errors += 1;
            }
            let _ = io_start;
        }

        let bytes_moved = (compute_ids.len() * element_size) as i64;
        let result = reduce_and_report(&timers, bytes_moved, comm, rep, print_text);
        iterations.push(result);

        decomp_core::free_decomp(Some(decomp));
    }

    let mut agg_check_errors: i64 = 0;
    comm.all_reduce_into(&total_check_errors, &mut agg_check_errors, SystemOperation::sum());

    if print_text && !iterations.is_empty() {
        report::print_summary(&iterations, comm);
        if check && comm.rank() == 0 {
            if agg_check_errors == 0 {
                println!("\nCHECK: round trip verified, 0 errors");
            } else {
                println!("\nCHECK: round trip FAILED, {} iterations with mismatches", agg_check_errors);
            }
        }
    }

    Ok(BenchmarkResults {
        iterations,
        check_errors: agg_check_errors,
    })
}

/// Fills each element's bytes with a value derived from its index,
/// the repetition and the rank, so a round-trip mismatch is
/// detectable regardless of `element_size`. Diagnostic only — the
/// crate's own test suite uses [`decomp_core::pattern`] for its
/// correctness checks.
fn fill_diagnostic_pattern(buf: &mut [u8], element_size: usize, rep: i32, rank: i32) {
    if element_size == 0 {
        return;
    }
    for (idx, chunk) in buf.chunks_mut(element_size).enumerate() {
        for (byte_offset, dst) in chunk.iter_mut().enumerate() {
            *dst = ((idx as i64 + rep as i64 + rank as i64 + byte_offset as i64) % 256) as u8;
        }
    }
}

/// Reduce timers and compute/print metrics for one repetition.
fn reduce_and_report(
    timers: &BenchTimers,
    bytes_moved: i64,
    comm: &SimpleCommunicator,
    rep: i32,
    print_text: bool,
) -> report::IterResult {
    let reduced = report::reduce_timers(timers, comm);
    let agg_bytes = report::reduce_bytes_moved(bytes_moved, comm);
    let result = report::compute_metrics(&reduced, agg_bytes, comm, rep);

    if print_text {
        report::print_result(&result, comm);
    }

    result
}
