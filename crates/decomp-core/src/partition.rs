//! Pure block-partition math: which ranks are I/O ranks, what contiguous
//! window of the global index space each one owns, and the inverse
//! question (which I/O rank owns a given global element).

use crate::error::DecompError;

/// Returns `true` if `rank` is one of the chosen I/O ranks under this
/// policy: `0 <= rank < num_io_tasks * io_stride` and `rank` is a
/// multiple of `io_stride`.
fn is_io_rank(rank: i32, num_io_tasks: i32, io_stride: i32) -> bool {
    rank >= 0
        && rank < num_io_tasks * io_stride
        && rank % io_stride == 0
        && rank / io_stride < num_io_tasks
}

fn validate_policy(num_io_tasks: i32, io_stride: i32, group_size: i32) -> Result<(), DecompError> {
    if num_io_tasks <= 0 || io_stride <= 0 {
        return Err(DecompError::InvalidArgument);
    }
    if num_io_tasks
        .checked_mul(io_stride)
        .is_none_or(|span| span > group_size)
    {
        return Err(DecompError::InvalidArgument);
    }
    Ok(())
}

/// The two block sizes every contiguous partition of `n_global` into
/// `num_io_tasks` pieces is built from, plus how many pieces get the
/// larger one.
struct BlockShape {
    big: i64,
    small: i64,
    num_big: i64,
}

fn block_shape(n_global: i64, num_io_tasks: i32) -> BlockShape {
    let num_io_tasks = num_io_tasks as i64;
    BlockShape {
        big: n_global.div_ceil(num_io_tasks),
        small: n_global / num_io_tasks,
        num_big: n_global % num_io_tasks,
    }
}

/// Maps `(rank, num_io_tasks, io_stride, n_global)` to this rank's
/// contiguous, disjoint window of the global index space. Non-I/O ranks
/// get `(0, 0)`.
///
/// The first `n_global mod num_io_tasks` I/O ranks (in ascending I/O-rank
/// order) get `ceil(n_global / num_io_tasks)` elements each; the rest get
/// `floor(n_global / num_io_tasks)`.
pub fn io_elements(
    rank: i32,
    num_io_tasks: i32,
    io_stride: i32,
    n_global: i64,
    group_size: i32,
) -> Result<(i64, i64), DecompError> {
    validate_policy(num_io_tasks, io_stride, group_size)?;

    if !is_io_rank(rank, num_io_tasks, io_stride) {
        return Ok((0, 0));
    }

    let io_index = (rank / io_stride) as i64;
    let shape = block_shape(n_global, num_io_tasks);

    let (io_start, io_count) = if io_index < shape.num_big {
        (io_index * shape.big, shape.big)
    } else {
        let head = shape.num_big * shape.big;
        let offset = (io_index - shape.num_big) * shape.small;
        (head + offset, shape.small)
    };

    Ok((io_start, io_count))
}

/// Inverts [`io_elements`]: given a global element ID, returns the rank
/// of the I/O process whose window contains it. Pure and
/// communication-free, because the I/O-side partition is a public
/// function of the policy alone.
pub fn io_owner_of(
    element_id: i64,
    num_io_tasks: i32,
    io_stride: i32,
    n_global: i64,
    group_size: i32,
) -> Result<i32, DecompError> {
    validate_policy(num_io_tasks, io_stride, group_size)?;
    if element_id < 0 || element_id >= n_global {
        return Err(DecompError::InvalidArgument);
    }

    let shape = block_shape(n_global, num_io_tasks);
    let head = shape.num_big * shape.big;

    let io_index = if element_id < head {
        element_id / shape.big
    } else if shape.small > 0 {
        shape.num_big + (element_id - head) / shape.small
    } else {
        // small == 0 can only happen when num_io_tasks > n_global, in
        // which case every global id falls in the "big" head region.
        return Err(DecompError::InvalidArgument);
    };

    Ok((io_index * io_stride as i64) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_rank_single_io_task_owns_everything() {
        assert_eq!(io_elements(0, 1, 1, 4, 1).unwrap(), (0, 4));
    }

    #[test]
    fn s4_remainder_goes_to_lowest_io_rank() {
        assert_eq!(io_elements(0, 2, 1, 5, 2).unwrap(), (0, 3));
        assert_eq!(io_elements(1, 2, 1, 5, 2).unwrap(), (3, 2));
    }

    #[test]
    fn non_io_rank_gets_empty_window() {
        assert_eq!(io_elements(1, 2, 2, 16, 4).unwrap(), (0, 0));
        assert_eq!(io_elements(3, 2, 2, 16, 4).unwrap(), (0, 0));
    }

    #[test]
    fn s2_two_io_ranks_with_stride_two() {
        assert_eq!(io_elements(0, 2, 2, 16, 4).unwrap(), (0, 8));
        assert_eq!(io_elements(2, 2, 2, 16, 4).unwrap(), (8, 8));
    }

    #[test]
    fn s5_impossible_policy_is_invalid_argument() {
        assert_eq!(
            io_elements(0, 3, 2, 16, 4).unwrap_err(),
            DecompError::InvalidArgument
        );
    }

    #[test]
    fn zero_or_negative_policy_values_are_invalid() {
        assert!(io_elements(0, 0, 1, 16, 4).is_err());
        assert!(io_elements(0, 1, 0, 16, 4).is_err());
        assert!(io_elements(0, -1, 1, 16, 4).is_err());
    }

    #[test]
    fn partition_completeness_across_all_ranks() {
        for group_size in [1, 2, 4, 8, 16] {
            for num_io_tasks in 1..=group_size {
                for io_stride in 1..=(group_size / num_io_tasks).max(1) {
                    if num_io_tasks * io_stride > group_size {
                        continue;
                    }
                    let n_global = 97i64;
                    let mut windows = Vec::new();
                    for rank in 0..group_size {
                        let (start, count) =
                            io_elements(rank, num_io_tasks, io_stride, n_global, group_size)
                                .unwrap();
                        if count > 0 {
                            windows.push((start, start + count));
                        }
                    }
                    windows.sort();
                    let mut cursor = 0i64;
                    for (start, end) in &windows {
                        assert_eq!(*start, cursor, "gap or overlap in partition");
                        cursor = *end;
                    }
                    assert_eq!(cursor, n_global);
                }
            }
        }
    }

    #[test]
    fn owner_inversion_matches_forward_partition() {
        let group_size = 8;
        let num_io_tasks = 3;
        let io_stride = 2;
        let n_global = 101i64;

        for e in 0..n_global {
            let owner =
                io_owner_of(e, num_io_tasks, io_stride, n_global, group_size).unwrap();
            let (start, count) =
                io_elements(owner, num_io_tasks, io_stride, n_global, group_size).unwrap();
            assert!(e >= start && e < start + count, "owner window mismatch for {e}");
        }
    }

    #[test]
    fn owner_of_out_of_range_id_is_invalid_argument() {
        assert!(io_owner_of(-1, 1, 1, 10, 1).is_err());
        assert!(io_owner_of(10, 1, 1, 10, 1).is_err());
    }
}
