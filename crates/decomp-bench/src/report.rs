use decomp_core::timer::BenchTimers;
use mpi::collective::SystemOperation;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

const MEBIBYTE: f64 = 1_048_576.0;

/// Per-repetition result for one decomposition benchmark iteration.
#[derive(Debug, Clone)]
pub struct IterResult {
    /// Aggregate bandwidth across both transfer directions, bytes/sec
    pub bw: f64,
    /// Decomposition construction time
    pub create_time: f64,
    /// Compute-to-I/O transfer time
    pub xfer_out_time: f64,
    /// I/O-to-compute transfer time
    pub xfer_in_time: f64,
    /// Total time (create_start to xfer_in_stop)
    pub total_time: f64,
    /// Aggregate bytes moved across all ranks (one direction)
    pub bytes_moved: i64,
    /// Repetition number
    pub rep: i32,
}

/// Reduce timers across MPI ranks: starts with MPI_MIN, stops with
/// MPI_MAX, so the reduced interval spans the slowest-starting to the
/// slowest-finishing rank for each phase.
pub fn reduce_timers(timers: &BenchTimers, comm: &SimpleCommunicator) -> BenchTimers {
    let rank = comm.rank();
    let root = comm.process_at_rank(0);

    let mut reduced = BenchTimers::default();

    for i in 0..decomp_core::timer::DECOMP_NB_TIMERS {
        let val = timers.timers[i];
        let op = if i % 2 == 0 {
            SystemOperation::min()
        } else {
            SystemOperation::max()
        };
        if rank == 0 {
            root.reduce_into_root(&val, &mut reduced.timers[i], op);
        } else {
            root.reduce_into(&val, op);
        }
    }

    reduced
}

/// Aggregate bytes moved across all ranks using MPI_Allreduce(SUM).
pub fn reduce_bytes_moved(local_bytes: i64, comm: &SimpleCommunicator) -> i64 {
    let mut agg: i64 = 0;
    comm.all_reduce_into(&local_bytes, &mut agg, SystemOperation::sum());
    agg
}

/// Compute bandwidth and timing metrics from reduced timers.
pub fn compute_metrics(
    reduced: &BenchTimers,
    agg_bytes: i64,
    _comm: &SimpleCommunicator,
    rep: i32,
) -> IterResult {
    let total_time = reduced.total_time();
    let bw = if total_time > 0.0 {
        // Two directions of transfer move agg_bytes each.
        (agg_bytes as f64 * 2.0) / total_time
    } else {
        0.0
    };

    IterResult {
        bw,
        create_time: reduced.create_time(),
        xfer_out_time: reduced.xfer_out_time(),
        xfer_in_time: reduced.xfer_in_time(),
        total_time,
        bytes_moved: agg_bytes,
        rep,
    }
}

/// Print table header (rank 0 only).
pub fn print_header(comm: &SimpleCommunicator) {
    if comm.rank() != 0 {
        return;
    }
    println!();
    println!(
        "{:>10} {:>12} {:>12} {:>12} {:>12} {:>4}",
        "bw(MiB/s)", "create(s)", "xferOut(s)", "xferIn(s)", "total(s)", "iter"
    );
    println!(
        "{:>10} {:>12} {:>12} {:>12} {:>12} {:>4}",
        "---------", "----------", "----------", "----------", "----------", "----"
    );
}

/// Print one result row (rank 0 only).
pub fn print_result(result: &IterResult, comm: &SimpleCommunicator) {
    if comm.rank() != 0 {
        return;
    }
    println!(
        "{:>10.2} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>4}",
        result.bw / MEBIBYTE,
        result.create_time,
        result.xfer_out_time,
        result.xfer_in_time,
        result.total_time,
        result.rep,
    );
}

/// Summary statistics across repetitions.
#[derive(Debug, Clone)]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
}

impl SummaryStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                stddev: 0.0,
            };
        }
        let min = values.iter().cloned().reduce(f64::min).unwrap();
        let max = values.iter().cloned().reduce(f64::max).unwrap();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        Self {
            min,
            max,
            mean,
            stddev: variance.sqrt(),
        }
    }
}

/// Print summary of all repetitions (rank 0 only).
pub fn print_summary(results: &[IterResult], comm: &SimpleCommunicator) {
    if comm.rank() != 0 || results.is_empty() {
        return;
    }

    let bw_values: Vec<f64> = results.iter().map(|r| r.bw / MEBIBYTE).collect();
    let bw_stats = SummaryStats::from_values(&bw_values);

    println!();
    println!("Summary of all repetitions:");
    println!(
        "{:>10} {:>10} {:>10} {:>10}",
        "Max(MiB/s)", "Min(MiB/s)", "Mean(MiB/s)", "StdDev"
    );
    println!(
        "{:>10.2} {:>10.2} {:>10.2} {:>10.2}",
        bw_stats.max, bw_stats.min, bw_stats.mean, bw_stats.stddev,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_stats_of_uniform_values() {
        let stats = SummaryStats::from_values(&[2.0, 2.0, 2.0]);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 2.0);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.stddev, 0.0);
    }

    #[test]
    fn summary_stats_of_empty_is_zeroed() {
        let stats = SummaryStats::from_values(&[]);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.mean, 0.0);
    }
}
