use rmock_core::device::TriggerSender;

use log::{debug, warn};
use std::fs;
use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Device-side endpoint of the trigger channel. Sends are non-blocking
/// and fire-and-forget; the payload is one sentinel byte whose value is
/// meaningless, only its arrival counts.
pub struct TriggerClient {
    sock: UnixDatagram,
}

impl TriggerClient {
    pub fn connect<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let sock = UnixDatagram::unbound()?;
        sock.connect(path.as_ref())?;
        sock.set_nonblocking(true)?;
        debug!("Trigger channel connected to {:?}", path.as_ref());
        Ok(Self { sock })
    }
}

impl TriggerSender for TriggerClient {
    fn raise(&self) -> io::Result<()> {
        self.sock.send(&[0u8])?;
        Ok(())
    }
}

/// Driver-side endpoint, bound to the well-known socket path. A stale
/// socket from an earlier run is removed before binding; the endpoint
/// removes its own path again on drop, so the address is never reused
/// without cleanup.
pub struct TriggerServer {
    sock: UnixDatagram,
    path: PathBuf,
}

impl TriggerServer {
    pub fn bind<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        match fs::remove_file(&path) {
            Ok(()) => debug!("Removed stale trigger socket {:?}", path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let sock = UnixDatagram::bind(&path)?;
        Ok(Self { sock, path })
    }

    /// Drain exactly one sentinel datagram, waiting up to `timeout`.
    /// Returns false when nothing arrived in time.
    pub fn recv_one(&self, timeout: Duration) -> io::Result<bool> {
        self.sock.set_read_timeout(Some(timeout))?;
        let mut sentinel = [0u8; 1];
        match self.sock.recv(&mut sentinel) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(false),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Drop for TriggerServer {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Could not remove trigger socket {:?}: {}", self.path, e);
            }
        }
    }
}
