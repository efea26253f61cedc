pub mod regfile;
pub mod source;
pub mod trigger;

pub use regfile::MmapRegisterFile;
pub use source::ChannelEmulatedSource;
pub use trigger::{TriggerClient, TriggerServer};
