//! Live process memory reader (Windows / Linux)

use process_memory::{CopyAddress, Pid, ProcessHandle, TryIntoProcessHandle};

use super::{MemoryReader, ReadError};
use crate::Result;

/// Reads another process' memory through `process_memory`
pub struct ProcessMemory {
    pid: u32,
    handle: ProcessHandle,
}

impl std::fmt::Debug for ProcessMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMemory")
            .field("pid", &self.pid)
            .finish()
    }
}

// Safety: the handle is only used for read-only copies, which the OS
// serializes; ProcessHandle is a raw HANDLE on Windows and a pid on Linux.
unsafe impl Send for ProcessMemory {}
unsafe impl Sync for ProcessMemory {}

impl ProcessMemory {
    /// Open the process for reading. Discovering the pid is the caller's job.
    pub fn attach(pid: u32) -> Result<Self> {
        let handle = (pid as Pid).try_into_process_handle()?;
        tracing::debug!("Attached to process {}", pid);
        Ok(ProcessMemory { pid, handle })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl MemoryReader for ProcessMemory {
    fn read_into(&self, address: usize, buf: &mut [u8]) -> std::result::Result<(), ReadError> {
        self.handle
            .copy_address(address, buf)
            .map_err(|e| ReadError::Failed {
                address,
                size: buf.len(),
                reason: e.to_string(),
            })
    }
}
