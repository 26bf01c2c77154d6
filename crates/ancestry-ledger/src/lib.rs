//! The incremental ancestry ledger.
//!
//! A population run over many generations accumulates inheritance edges
//! without bound. Instead of appending every birth to the persisted edge
//! table and re-sorting the whole table before each simplification, this
//! crate buffers new edges per parent node and *stitches* the buffer into
//! the already-ordered persisted table at a cost proportional to the new
//! edges plus the touched parent blocks.
//!
//! # Architecture
//!
//! - [`buffer`] -- The [`EdgeBuffer`]: an arena of per-parent birth lists,
//!   indexed by node id, with one entry for every node ever created.
//! - [`stitch`] -- The merge of buffer and persisted table into one
//!   canonically ordered table, ready for simplification.
//!
//! # Recording seam
//!
//! The generation driver records births through the [`RecordBirth`] trait.
//! The buffered pipeline implements it on [`EdgeBuffer`]; the classic
//! reference pipeline implements it on [`EdgeTable`], appending directly
//! and sorting globally at the end. Both pipelines therefore share one
//! driver and one random stream.
//!
//! [`EdgeBuffer`]: buffer::EdgeBuffer
//! [`EdgeTable`]: ancestry_tables::EdgeTable

pub mod buffer;
pub mod stitch;

pub use buffer::{BufferError, BufferedEdge, EdgeBuffer, RecordBirth};
pub use stitch::{StitchError, stitch};
