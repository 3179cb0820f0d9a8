//! Mock implementations of the external-service traits, for tests that
//! exercise search and download flows without real trackers or a real
//! torrent backend.

mod mock_indexer;
mod mock_transfer;

pub use mock_indexer::MockIndexer;
pub use mock_transfer::{MockTransferClient, MockTransferFactory};
