//! The exchange-plan builder: turns each rank's arbitrary
//! compute-side element assignment and its (possibly empty) contiguous
//! I/O-side window into the two triplet tables the transfer engine needs.

use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::error::DecompError;
use crate::partition::io_owner_of;
use crate::triplet::{Triplet, TripletTable};

/// Builds `comp_list`: for every local compute element, which I/O rank
/// owns it. Purely local — the I/O-side partition is a public function
/// of policy parameters, so no peer needs to be asked.
pub fn build_comp_list(
    compute_ids: &[i64],
    num_io_tasks: i32,
    io_stride: i32,
    n_global: i64,
    group_size: i32,
) -> Result<TripletTable, DecompError> {
    let mut table = TripletTable::with_capacity(compute_ids.len());
    for (slot, &id) in compute_ids.iter().enumerate() {
        if id < 0 {
            return Err(DecompError::InvalidArgument);
        }
        let owner = io_owner_of(id, num_io_tasks, io_stride, n_global, group_size)?;
        table.push(Triplet::new(owner as i64, slot as i64, id));
    }
    Ok(table)
}

/// Builds `io_list` via a round-robin exchange: over `P`
/// steps, rank `rank` exchanges its `compute_ids` with peer
/// `(rank + s) mod P` (a mutual send/receive with the same partner; at
/// `s == 0` the peer is the rank itself and no MPI call is made), and
/// records every received element that falls in this rank's own
/// `[io_start, io_start + io_count)` window.
pub fn build_io_list(
    comm: &SimpleCommunicator,
    compute_ids: &[i64],
    io_start: i64,
    io_count: i64,
) -> Result<TripletTable, DecompError> {
    let rank = comm.rank();
    let size = comm.size();

    let mut io_list = TripletTable::new();
    let mut claimed = vec![false; io_count as usize];

    for s in 0..size {
        let peer = (rank + s).rem_euclid(size);

        let received: Vec<i64> = if peer == rank {
            compute_ids.to_vec()
        } else {
            mpi::request::scope(|scope| {
                let send_request = comm.process_at_rank(peer).immediate_send(scope, compute_ids);
                let (recv_buf, _status) = comm.process_at_rank(peer).receive_vec::<i64>();
                send_request.wait();
                recv_buf
            })
        };

        for id in received {
            if id < io_start || id >= io_start + io_count {
                continue;
            }
            let slot = (id - io_start) as usize;
            if claimed[slot] {
                return Err(DecompError::InvalidArgument);
            }
            claimed[slot] = true;
            io_list.push(Triplet::new(peer as i64, slot as i64, id));
        }
    }

    if claimed.iter().any(|&c| !c) {
        return Err(DecompError::InvalidArgument);
    }

    Ok(io_list)
}

/// Consistency check: every `io_list` entry must fall in
/// this rank's own I/O window and every `comp_list` entry must name a
/// valid rank. Tables are sorted by `element_id` beforehand, though the
/// checks themselves are linear scans over already-small local tables.
pub fn check_consistency(
    comp_list: &TripletTable,
    io_list: &TripletTable,
    io_start: i64,
    io_count: i64,
    group_size: i32,
) -> Result<(), DecompError> {
    for t in io_list {
        if t.element_id < io_start || t.element_id >= io_start + io_count {
            return Err(DecompError::InvalidArgument);
        }
    }
    for t in comp_list {
        if t.peer_rank < 0 || t.peer_rank >= group_size as i64 {
            return Err(DecompError::InvalidArgument);
        }
    }
    Ok(())
}

/// Re-sorts both tables by `peer_rank` with `element_id` as the
/// secondary key, the form the transfer engine requires. `local_slot`
/// must play no part in this ordering: on `comp_list` it is the
/// compute-buffer position, unrelated to `element_id` for an
/// interleaved layout, so tie-breaking on it instead would make the two
/// tables disagree on per-peer packing order.
pub fn finalize_order(comp_list: &mut TripletTable, io_list: &mut TripletTable) {
    comp_list.sort_by_peer_then_element();
    io_list.sort_by_peer_then_element();
}
