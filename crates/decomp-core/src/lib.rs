pub mod decomp;
pub mod error;
pub mod exchange;
pub mod partition;
pub mod pattern;
pub mod timer;
pub mod transfer;
pub mod triplet;

pub use decomp::{create_decomp, free_decomp, Decomposition};
pub use error::DecompError;
pub use partition::{io_elements, io_owner_of};
pub use timer::{now, BenchTimers};
pub use transfer::{transfer_field, XferDirection};
pub use triplet::{Triplet, TripletField, TripletTable};
