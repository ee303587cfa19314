//! The decomposition handle: the aggregate `create_decomp` builds
//! and `transfer_field` consumes read-only.

use mpi::collective::SystemOperation;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::error::DecompError;
use crate::exchange::{build_comp_list, build_io_list, check_consistency, finalize_order};
use crate::partition::io_elements;
use crate::transfer::{transfer_field, XferDirection};
use crate::triplet::TripletTable;

/// Owns the two triplet tables and the I/O window produced by
/// [`create_decomp`]. Immutable once built; `transfer_field` only reads
/// it.
#[derive(Debug, Clone)]
pub struct Decomposition {
    comp_list: TripletTable,
    io_list: TripletTable,
    io_start: i64,
    io_count: i64,
}

impl Decomposition {
    pub fn comp_list(&self) -> &TripletTable {
        &self.comp_list
    }

    pub fn io_list(&self) -> &TripletTable {
        &self.io_list
    }

    /// This rank's contiguous window of the global index space when
    /// acting as an I/O rank. `(0, 0)` on ranks not chosen.
    pub fn io_window(&self) -> (i64, i64) {
        (self.io_start, self.io_count)
    }

    /// Moves `element_size`-byte records between the compute-side and
    /// I/O-side layouts described by this handle, in the given
    /// direction. A single collective all-to-all.
    pub fn transfer(
        &self,
        comm: &SimpleCommunicator,
        direction: XferDirection,
        element_size: usize,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(), DecompError> {
        transfer_field(
            comm,
            &self.comp_list,
            &self.io_list,
            direction,
            element_size,
            input,
            output,
        )
    }
}

/// Builds a decomposition from each rank's compute-side element IDs and
/// an I/O-selection policy. Collective: every rank of `comm` must call
/// this in the same program order with policy values that resolve to
/// the same decomposition.
///
/// `n_global` is not a direct input: it is the all-reduced sum of every
/// rank's `n_compute`, since the compute-side ID set is assumed to
/// cover `[0, n_global)` exactly once.
pub fn create_decomp(
    comm: &SimpleCommunicator,
    n_compute: usize,
    compute_ids: &[i64],
    num_io_tasks: i32,
    io_stride: i32,
) -> Result<Decomposition, DecompError> {
    if compute_ids.len() != n_compute {
        return Err(DecompError::InvalidArgument);
    }

    let group_size = comm.size();
    let local_n_compute = n_compute as i64;
    let mut n_global: i64 = 0;
    comm.all_reduce_into(&local_n_compute, &mut n_global, SystemOperation::sum());

    let (io_start, io_count) =
        io_elements(comm.rank(), num_io_tasks, io_stride, n_global, group_size)?;

    let mut comp_list = build_comp_list(compute_ids, num_io_tasks, io_stride, n_global, group_size)?;
    let mut io_list = build_io_list(comm, compute_ids, io_start, io_count)?;

    check_consistency(&comp_list, &io_list, io_start, io_count, group_size)?;
    finalize_order(&mut comp_list, &mut io_list);

    Ok(Decomposition {
        comp_list,
        io_list,
        io_start,
        io_count,
    })
}

/// Releases a decomposition. Idempotent on an already-`None` handle;
/// the Rust expression of "pointer nulled" is simply dropping the
/// owned value and leaving the caller with `None`.
pub fn free_decomp(handle: Option<Decomposition>) {
    drop(handle);
}
