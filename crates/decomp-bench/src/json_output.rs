use serde::Serialize;

use crate::report::{IterResult, SummaryStats};
use crate::runner::BenchmarkResults;

const MEBIBYTE: f64 = 1_048_576.0;

#[derive(Serialize)]
pub struct DecompJsonDocument {
    pub version: String,
    pub began: String,
    pub command_line: String,
    pub machine: String,
    pub parameters: DecompJsonParameters,
    pub results: Vec<DecompJsonResult>,
    pub summary: DecompJsonSummary,
    pub check_errors: i64,
    pub finished: String,
}

#[derive(Serialize)]
pub struct DecompJsonParameters {
    #[serde(rename = "nGlobal")]
    pub n_global: i64,
    #[serde(rename = "numIoTasks")]
    pub num_io_tasks: i32,
    #[serde(rename = "ioStride")]
    pub io_stride: i32,
    #[serde(rename = "elementSize")]
    pub element_size: usize,
    pub repetitions: i32,
    #[serde(rename = "numTasks")]
    pub num_tasks: i32,
}

#[derive(Serialize)]
pub struct DecompJsonResult {
    #[serde(rename = "bwMiB")]
    pub bw_mib: f64,
    #[serde(rename = "createTime")]
    pub create_time: f64,
    #[serde(rename = "xferOutTime")]
    pub xfer_out_time: f64,
    #[serde(rename = "xferInTime")]
    pub xfer_in_time: f64,
    #[serde(rename = "totalTime")]
    pub total_time: f64,
    #[serde(rename = "bytesMoved")]
    pub bytes_moved: i64,
    pub iter: i32,
}

#[derive(Serialize)]
pub struct DecompJsonSummary {
    #[serde(rename = "bwMaxMiB")]
    pub bw_max_mib: f64,
    #[serde(rename = "bwMinMiB")]
    pub bw_min_mib: f64,
    #[serde(rename = "bwMeanMiB")]
    pub bw_mean_mib: f64,
    #[serde(rename = "bwStdMiB")]
    pub bw_std_mib: f64,
}

#[allow(clippy::too_many_arguments)]
pub fn build_json_document(
    n_global: i64,
    num_io_tasks: i32,
    io_stride: i32,
    element_size: usize,
    repetitions: i32,
    num_tasks: i32,
    results: &BenchmarkResults,
    command_line: &str,
) -> DecompJsonDocument {
    let began = current_time_string();
    let machine = get_machine_string();

    let parameters = DecompJsonParameters {
        n_global,
        num_io_tasks,
        io_stride,
        element_size,
        repetitions,
        num_tasks,
    };

    let json_results: Vec<DecompJsonResult> =
        results.iterations.iter().map(iter_result_to_json).collect();

    let bw_values: Vec<f64> = results.iterations.iter().map(|r| r.bw / MEBIBYTE).collect();
    let bw_stats = SummaryStats::from_values(&bw_values);
    let summary = DecompJsonSummary {
        bw_max_mib: bw_stats.max,
        bw_min_mib: bw_stats.min,
        bw_mean_mib: bw_stats.mean,
        bw_std_mib: bw_stats.stddev,
    };

    let finished = current_time_string();

    DecompJsonDocument {
        version: env!("CARGO_PKG_VERSION").to_string(),
        began,
        command_line: command_line.to_string(),
        machine,
        parameters,
        results: json_results,
        summary,
        check_errors: results.check_errors,
        finished,
    }
}

fn iter_result_to_json(r: &IterResult) -> DecompJsonResult {
    DecompJsonResult {
        bw_mib: r.bw / MEBIBYTE,
        create_time: r.create_time,
        xfer_out_time: r.xfer_out_time,
        xfer_in_time: r.xfer_in_time,
        total_time: r.total_time,
        bytes_moved: r.bytes_moved,
        iter: r.rep,
    }
}

pub fn current_time_string() -> String {
    unsafe {
        let mut t: libc::time_t = 0;
        libc::time(&mut t);
        let tm = libc::localtime(&t);
        if tm.is_null() {
            return String::new();
        }
        let mut buf = [0u8; 64];
        let fmt = b"%a %b %d %H:%M:%S %Y\0";
        let len = libc::strftime(
            buf.as_mut_ptr() as *mut libc::c_char,
            buf.len(),
            fmt.as_ptr() as *const libc::c_char,
            tm,
        );
        String::from_utf8_lossy(&buf[..len]).to_string()
    }
}

pub fn get_machine_string() -> String {
    unsafe {
        let mut uts: libc::utsname = std::mem::zeroed();
        if libc::uname(&mut uts) != 0 {
            return String::new();
        }
        let nodename = std::ffi::CStr::from_ptr(uts.nodename.as_ptr());
        let sysname = std::ffi::CStr::from_ptr(uts.sysname.as_ptr());
        let release = std::ffi::CStr::from_ptr(uts.release.as_ptr());
        format!(
            "{} {} {}",
            nodename.to_string_lossy(),
            sysname.to_string_lossy(),
            release.to_string_lossy(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_json_document_serializes() {
        let results = BenchmarkResults {
            iterations: vec![IterResult {
                bw: 200.0 * MEBIBYTE,
                create_time: 0.001,
                xfer_out_time: 0.01,
                xfer_in_time: 0.01,
                total_time: 0.021,
                bytes_moved: 8192,
                rep: 0,
            }],
            check_errors: 0,
        };

        let doc = build_json_document(1024, 1, 1, 8, 1, 4, &results, "decomp-bench -n 1024");
        let json = serde_json::to_string_pretty(&doc).unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"bwMiB\""));
        assert!(json.contains("\"nGlobal\""));
    }
}
