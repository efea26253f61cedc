use rmock_core::constants::MIN_REGISTER_FILE_LEN;
use rmock_core::regs::RegisterBlock;

use log::error;
use memmap2::MmapMut;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Register file backed by a shared file mapping. Both sides map the same
/// file, so a write by one is immediately visible to the other; no
/// explicit memory barriers are issued, plain shared-memory visibility is
/// an accepted approximation of the real bus.
pub struct MmapRegisterFile {
    map: MmapMut,
}

impl MmapRegisterFile {
    /// Map an existing backing file read/write shared
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let map = unsafe { MmapMut::map_mut(&file)? };
        Self::validate(map)
    }

    /// Create a zero-filled backing file of `len` bytes and map it
    pub fn create<P: AsRef<Path>>(path: P, len: usize) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(len as u64)?;
        let map = unsafe { MmapMut::map_mut(&file)? };
        Self::validate(map)
    }

    fn validate(map: MmapMut) -> io::Result<Self> {
        if map.len() < MIN_REGISTER_FILE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "register file holds {} bytes, the layout needs {}",
                    map.len(),
                    MIN_REGISTER_FILE_LEN
                ),
            ));
        }
        Ok(Self { map })
    }
}

impl RegisterBlock for MmapRegisterFile {
    fn len(&self) -> usize {
        self.map.len()
    }

    fn read8(&self, offset: u16) -> u8 {
        let idx = offset as usize;
        if idx >= self.map.len() {
            error!("Out-of-range register read (offset 0x{:x})", offset);
            return 0;
        }
        self.map[idx]
    }

    fn write8(&mut self, offset: u16, value: u8) {
        let idx = offset as usize;
        if idx >= self.map.len() {
            error!("Out-of-range register write (offset 0x{:x})", offset);
            return;
        }
        self.map[idx] = value;
    }

    fn read16(&self, offset: u16) -> u16 {
        let idx = offset as usize;
        if idx + 1 >= self.map.len() {
            error!("Out-of-range register read (offset 0x{:x})", offset);
            return 0;
        }
        u16::from_le_bytes([self.map[idx], self.map[idx + 1]])
    }

    fn write16(&mut self, offset: u16, value: u16) {
        let idx = offset as usize;
        if idx + 1 >= self.map.len() {
            error!("Out-of-range register write (offset 0x{:x})", offset);
            return;
        }
        let le = value.to_le_bytes();
        self.map[idx] = le[0];
        self.map[idx + 1] = le[1];
    }
}
