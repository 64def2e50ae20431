use thiserror::Error;

/// Errors reported by [`ChainHashMap`](crate::ChainHashMap) operations.
///
/// A missing key is not an error: `get` returns `None` and `unset` of an
/// absent key succeeds without effect.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// Bucket storage could not be reserved, or a count would overflow `u32`.
    #[error("allocation failed")]
    AllocationFailure,

    /// The size hint and load threshold do not produce a usable bucket count.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// `set` or `unset` was attempted while cursors are open.
    #[error("table is locked by {open_cursors} open cursor(s)")]
    LockedMutation { open_cursors: u32 },

    /// A cursor was advanced on a table that did not open it.
    #[error("cursor belongs to a different table")]
    ForeignCursor,
}

pub type Result<T> = core::result::Result<T, TableError>;
