//! The field transfer engine: packs a caller buffer according to
//! a triplet table, all-to-alls it, and unpacks into the caller's output
//! buffer. Oblivious to the scalar type carried — only `element_size`
//! bytes per record matter.

use mpi::datatype::{Partition, PartitionMut};
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;
use mpi::Count;

use crate::error::DecompError;
use crate::triplet::TripletTable;

/// Which table drives the send side and which drives the receive side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XferDirection {
    /// `comp_list` sends, `io_list` receives.
    CompToIo,
    /// `io_list` sends, `comp_list` receives.
    IoToComp,
}

/// Executes one collective all-to-all exchange of `element_size`-byte
/// records, moving bytes from `input` (laid out per `send_table`'s
/// `local_slot`) to `output` (laid out per `recv_table`'s `local_slot`).
pub fn transfer_field(
    comm: &SimpleCommunicator,
    comp_list: &TripletTable,
    io_list: &TripletTable,
    direction: XferDirection,
    element_size: usize,
    input: &[u8],
    output: &mut [u8],
) -> Result<(), DecompError> {
    if element_size == 0 {
        return Err(DecompError::InvalidArgument);
    }

    let (send_table, recv_table) = match direction {
        XferDirection::CompToIo => (comp_list, io_list),
        XferDirection::IoToComp => (io_list, comp_list),
    };

    let num_procs = comm.size() as usize;

    let send_buf = pack(send_table, element_size, input)?;
    let (send_counts, send_displs) = counts_and_displs(send_table, element_size, num_procs);

    let mut recv_buf = vec![0u8; recv_table.len() * element_size];
    let (recv_counts, recv_displs) = counts_and_displs(recv_table, element_size, num_procs);

    {
        let send_partition = Partition::new(&send_buf[..], send_counts.as_slice(), send_displs.as_slice());
        let mut recv_partition = PartitionMut::new(
            &mut recv_buf[..],
            recv_counts.as_slice(),
            recv_displs.as_slice(),
        );
        comm.all_to_all_varcount_into(&send_partition, &mut recv_partition);
    }

    unpack(recv_table, element_size, &recv_buf, output)
}

/// Gathers `element_size` bytes from `input` at each triplet's
/// `local_slot`, in the table's existing (peer-rank-sorted) order.
fn pack(table: &TripletTable, element_size: usize, input: &[u8]) -> Result<Vec<u8>, DecompError> {
    let mut buf = vec![0u8; table.len() * element_size];
    for (i, t) in table.iter().enumerate() {
        let src_start = t.local_slot as usize * element_size;
        let src = input
            .get(src_start..src_start + element_size)
            .ok_or(DecompError::InvalidArgument)?;
        buf[i * element_size..(i + 1) * element_size].copy_from_slice(src);
    }
    Ok(buf)
}

/// Scatters `element_size` bytes from `recv_buf` (in peer-rank-sorted
/// order, matching the sender's packing) into `output` at each
/// triplet's `local_slot`.
fn unpack(
    table: &TripletTable,
    element_size: usize,
    recv_buf: &[u8],
    output: &mut [u8],
) -> Result<(), DecompError> {
    for (i, t) in table.iter().enumerate() {
        let dst_start = t.local_slot as usize * element_size;
        let dst = output
            .get_mut(dst_start..dst_start + element_size)
            .ok_or(DecompError::InvalidArgument)?;
        dst.copy_from_slice(&recv_buf[i * element_size..(i + 1) * element_size]);
    }
    Ok(())
}

/// Per-peer byte counts and displacements for the all-to-all, derived by
/// a single linear pass over a table already sorted by `peer_rank`,
/// accumulating per-peer run lengths.
fn counts_and_displs(
    table: &TripletTable,
    element_size: usize,
    num_procs: usize,
) -> (Vec<Count>, Vec<Count>) {
    let mut counts = vec![0 as Count; num_procs];
    for t in table {
        counts[t.peer_rank as usize] += 1;
    }

    let mut displs = vec![0 as Count; num_procs];
    let mut running: Count = 0;
    for p in 0..num_procs {
        displs[p] = running;
        running += counts[p];
    }

    for c in counts.iter_mut() {
        *c *= element_size as Count;
    }
    for d in displs.iter_mut() {
        *d *= element_size as Count;
    }

    (counts, displs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triplet::Triplet;

    #[test]
    fn zero_element_size_is_invalid() {
        let comp = TripletTable::new();
        let io = TripletTable::new();
        // Build a no-op communicator-free check by exercising pack/unpack
        // helpers directly instead of the full collective call, since
        // that requires a live MPI universe.
        assert!(counts_and_displs(&comp, 0, 1).0.iter().all(|&c| c == 0));
        let _ = io;
    }

    #[test]
    fn pack_preserves_peer_sorted_order() {
        let mut table = TripletTable::new();
        table.push(Triplet::new(0, 2, 20));
        table.push(Triplet::new(0, 0, 0));
        table.push(Triplet::new(1, 1, 10));

        let element_size = 4usize;
        let mut input = vec![0u8; 3 * element_size];
        for slot in 0..3 {
            input[slot * element_size..(slot + 1) * element_size]
                .copy_from_slice(&(slot as u32).to_ne_bytes());
        }

        let packed = pack(&table, element_size, &input).unwrap();
        assert_eq!(
            u32::from_ne_bytes(packed[0..4].try_into().unwrap()),
            2
        );
        assert_eq!(
            u32::from_ne_bytes(packed[4..8].try_into().unwrap()),
            0
        );
        assert_eq!(
            u32::from_ne_bytes(packed[8..12].try_into().unwrap()),
            1
        );
    }

    #[test]
    fn counts_and_displs_group_by_peer() {
        let mut table = TripletTable::new();
        table.push(Triplet::new(0, 0, 0));
        table.push(Triplet::new(0, 1, 1));
        table.push(Triplet::new(2, 0, 2));

        let (counts, displs) = counts_and_displs(&table, 8, 3);
        assert_eq!(counts, vec![16, 0, 8]);
        assert_eq!(displs, vec![0, 16, 16]);
    }

    #[test]
    fn pack_out_of_bounds_slot_is_invalid_argument() {
        let mut table = TripletTable::new();
        table.push(Triplet::new(0, 5, 0));
        let input = vec![0u8; 4];
        assert!(pack(&table, 4, &input).is_err());
    }
}
