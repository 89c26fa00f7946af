//! Error type for the virtual-memory layer.

use std::error::Error;
use std::fmt;

/// Errors surfaced by the OS virtual-memory primitives.
///
/// `code` carries the raw OS error number when one was available
/// (`errno` on Unix, `GetLastError` on Windows).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VmError {
    /// The OS refused to reserve address space, e.g. the address space
    /// of the process is exhausted.
    ReserveFailed {
        /// Number of bytes requested.
        size: usize,
        /// Raw OS error code, if available.
        code: Option<i32>,
    },
    /// Committing physical memory to a reserved range failed.
    CommitFailed {
        /// Offset of the requested range within its reservation.
        offset: usize,
        /// Length of the requested range in bytes.
        len: usize,
        /// Raw OS error code, if available.
        code: Option<i32>,
    },
    /// Returning committed pages to the OS failed.
    DecommitFailed {
        /// Offset of the requested range within its reservation.
        offset: usize,
        /// Length of the requested range in bytes.
        len: usize,
        /// Raw OS error code, if available.
        code: Option<i32>,
    },
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::ReserveFailed { size, code } => {
                write!(f, "reserving {size} bytes of address space failed")?;
                code
            }
            Self::CommitFailed { offset, len, code } => {
                write!(f, "committing {len} bytes at offset {offset} failed")?;
                code
            }
            Self::DecommitFailed { offset, len, code } => {
                write!(f, "decommitting {len} bytes at offset {offset} failed")?;
                code
            }
        };
        if let Some(code) = code {
            write!(f, " (os error {code})")?;
        }
        Ok(())
    }
}

impl Error for VmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_os_code_when_present() {
        let err = VmError::CommitFailed {
            offset: 4096,
            len: 128,
            code: Some(12),
        };
        let text = err.to_string();
        assert!(text.contains("offset 4096"));
        assert!(text.contains("os error 12"));
    }

    #[test]
    fn display_omits_os_code_when_absent() {
        let err = VmError::ReserveFailed {
            size: 1024,
            code: None,
        };
        assert!(!err.to_string().contains("os error"));
    }
}
