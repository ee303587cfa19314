use clap::Parser;

/// decomp-bench — diagnostic driver for the compute/I/O decomposition engine.
///
/// Builds a synthetic compute-side element assignment, derives a
/// decomposition, and times repeated round-trip transfers through it.
#[derive(Parser, Debug)]
#[command(name = "decomp-bench", about = "Decomposition exchange benchmark")]
pub struct CliArgs {
    /// Size of the global index space. Defaults to 1024 elements per task.
    #[arg(short = 'n', long = "n-global", default_value_t = 0)]
    pub n_global: i64,

    /// Number of I/O tasks selected from the process group
    #[arg(long = "num-io-tasks", default_value_t = 1)]
    pub num_io_tasks: i32,

    /// Rank stride between selected I/O tasks
    #[arg(long = "io-stride", default_value_t = 1)]
    pub io_stride: i32,

    /// Size in bytes of each transferred record
    #[arg(short = 'e', long = "element-size", default_value_t = 8)]
    pub element_size: usize,

    /// Number of repetitions of the round-trip transfer
    #[arg(short = 'i', long = "repetitions", default_value_t = 1)]
    pub repetitions: i32,

    /// Verify round-trip data integrity with the deterministic fill pattern
    #[arg(long = "check")]
    pub check: bool,

    /// Output results as JSON to stdout (suppresses text output)
    #[arg(long = "json")]
    pub json: bool,

    /// Output results as JSON to file (text output still printed)
    #[arg(long = "json-file")]
    pub json_file: Option<String>,
}

impl CliArgs {
    /// Resolves the requested global index space size, defaulting to
    /// 1024 elements per compute rank when unset.
    pub fn resolve_n_global(&self, group_size: i32) -> i64 {
        if self.n_global > 0 {
            self.n_global
        } else {
            1024 * group_size as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_n_global_defaults_per_task() {
        let args = CliArgs {
            n_global: 0,
            num_io_tasks: 1,
            io_stride: 1,
            element_size: 8,
            repetitions: 1,
            check: false,
            json: false,
            json_file: None,
        };
        assert_eq!(args.resolve_n_global(4), 4096);
    }

    #[test]
    fn resolve_n_global_honors_explicit_value() {
        let args = CliArgs {
            n_global: 77,
            num_io_tasks: 1,
            io_stride: 1,
            element_size: 8,
            repetitions: 1,
            check: false,
            json: false,
            json_file: None,
        };
        assert_eq!(args.resolve_n_global(4), 77);
    }
}
