//! Error types for avrisp-core
//!
//! These errors cover caller mistakes: bad image geometry, unknown chip
//! names. Protocol-level failures during a programming run (bad enable echo,
//! signature mismatch, verify mismatch) are deliberately not errors; they are
//! captured in the [`SessionReport`](crate::session::SessionReport) so a run
//! always completes with a full report.

use thiserror::Error;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Page size must be a nonzero even byte count (pages are word-organized)
    #[error("invalid page size {0}: must be a nonzero even byte count")]
    InvalidPageSize(u32),

    /// Image base address must fall on a page boundary
    #[error("base address 0x{base:04X} is not aligned to the {page_size}-byte page size")]
    UnalignedBaseAddress {
        /// The offending base address
        base: u32,
        /// The declared page size
        page_size: u32,
    },

    /// An empty image has nothing to program
    #[error("firmware image is empty")]
    EmptyImage,

    /// Image does not fit in the target's flash
    #[error("image of {len} bytes at base 0x{base:04X} exceeds {flash_size} bytes of flash")]
    ImageTooLarge {
        /// Image length in bytes
        len: usize,
        /// Image base address
        base: u32,
        /// Target flash size in bytes
        flash_size: u32,
    },

    /// Chip name not present in the descriptor table
    #[error("unknown chip '{0}'")]
    UnknownChip(String),
}

/// Result type alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
