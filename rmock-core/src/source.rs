use crate::error::LifecycleError;
use crate::irq::IrqReturn;
use crate::regs::{RegisterBlock, Registers};

use log::{debug, warn};
use std::time::Duration;

/// Capability over the thing that turns device events into handler
/// invocations. Two variants exist: a claimed physical interrupt line and
/// the socket-based emulation path. The lifecycle controller is written
/// once against this trait.
pub trait EventSource<B: RegisterBlock> {
    /// Install the interrupt consumer. The lifecycle controller calls this
    /// with link-change events still masked.
    fn bind_handler(&mut self) -> Result<(), LifecycleError>;

    fn unbind_handler(&mut self);

    /// Allow delivery of further events
    fn enable(&mut self) -> Result<(), LifecycleError>;

    /// Stop delivery of further events
    fn disable(&mut self);

    /// Wait up to `timeout` for one trigger and run the handler for it.
    /// Returns `None` when nothing arrived in time.
    fn poll(
        &mut self,
        regs: &mut Registers<B>,
        timeout: Duration,
    ) -> std::io::Result<Option<IrqReturn>>;
}

/// Handle claimed from the host's resource-ownership registry. Dropping it
/// releases the claim, which teardown does last.
pub struct ResourceHandle {
    id: u32,
}

impl ResourceHandle {
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        debug!("Releasing claimed device resource {:#x}", self.id);
    }
}

/// Collaborator that locates and hands out exclusive device resources by
/// vendor/device identification
pub trait ResourceRegistry {
    fn claim(&mut self, vendor: u16, device: u16) -> Option<ResourceHandle>;
}

/// The real-hardware event source: an interrupt line belonging to a
/// claimed device resource. Delivery happens through the host's interrupt
/// plumbing, so `poll` never synthesizes events here; this variant exists
/// for the lifecycle bookkeeping around the claimed handle.
pub struct PhysicalLineSource {
    handle: ResourceHandle,
    line: u32,
    bound: bool,
}

impl PhysicalLineSource {
    /// Claim the emulated NIC from the registry and wrap its line
    pub fn claim<R: ResourceRegistry>(registry: &mut R, line: u32) -> Result<Self, LifecycleError> {
        let handle = registry
            .claim(crate::constants::pci::VENDOR_ID, crate::constants::pci::DEVICE_ID)
            .ok_or(LifecycleError::ResourceUnavailable)?;
        debug!("Claimed device resource {:#x} on line {}", handle.id(), line);
        Ok(Self {
            handle,
            line,
            bound: false,
        })
    }

    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }
}

impl<B: RegisterBlock> EventSource<B> for PhysicalLineSource {
    fn bind_handler(&mut self) -> Result<(), LifecycleError> {
        debug!("Installing shared handler on line {}", self.line);
        self.bound = true;
        Ok(())
    }

    fn unbind_handler(&mut self) {
        debug!("Removing handler from line {}", self.line);
        self.bound = false;
    }

    fn enable(&mut self) -> Result<(), LifecycleError> {
        Ok(())
    }

    fn disable(&mut self) {}

    fn poll(
        &mut self,
        _regs: &mut Registers<B>,
        timeout: Duration,
    ) -> std::io::Result<Option<IrqReturn>> {
        if !self.bound {
            warn!("Poll on line {} without an installed handler", self.line);
        }
        // hardware delivers asynchronously through the host; nothing to
        // drain from user space
        std::thread::sleep(timeout);
        Ok(None)
    }
}
