mod librqbit;
mod types;

pub use librqbit::{LibrqbitFactory, LibrqbitTransfer};
pub use types::*;
