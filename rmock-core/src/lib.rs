pub mod constants;
pub mod device;
pub mod error;
pub mod irq;
pub mod lifecycle;
pub mod regs;
pub mod source;
