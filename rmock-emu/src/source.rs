use crate::trigger::TriggerServer;

use rmock_core::error::LifecycleError;
use rmock_core::irq::{link_change_handler, IrqReturn};
use rmock_core::regs::{RegisterBlock, Registers};
use rmock_core::source::EventSource;

use log::debug;
use std::io;
use std::time::Duration;

/// The user-mode emulation event source: a datagram socket standing in
/// for the interrupt line.
///
/// Delivery drains exactly one sentinel byte and then runs the handler
/// with the channel disarmed; a guard re-arms it on every exit path,
/// including a handler panic. Known limitation: the channel queues no
/// events of its own, so a second toggle landing between a drain and the
/// re-arm coalesces with the first into a single observable delivery.
pub struct ChannelEmulatedSource {
    server: TriggerServer,
    bound: bool,
    enabled: bool,
    armed: bool,
}

impl ChannelEmulatedSource {
    pub fn new(server: TriggerServer) -> Self {
        Self {
            server,
            bound: false,
            enabled: false,
            armed: false,
        }
    }
}

// Restores delivery eligibility when dropped, so an early return or a
// panic inside the handler cannot permanently lose future interrupts
struct RearmGuard<'a> {
    armed: &'a mut bool,
}

impl<'a> Drop for RearmGuard<'a> {
    fn drop(&mut self) {
        *self.armed = true;
    }
}

impl<B: RegisterBlock> EventSource<B> for ChannelEmulatedSource {
    fn bind_handler(&mut self) -> Result<(), LifecycleError> {
        debug!("Installing handler on the emulated line");
        self.bound = true;
        Ok(())
    }

    fn unbind_handler(&mut self) {
        self.bound = false;
    }

    fn enable(&mut self) -> Result<(), LifecycleError> {
        self.enabled = true;
        self.armed = true;
        Ok(())
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn poll(
        &mut self,
        regs: &mut Registers<B>,
        timeout: Duration,
    ) -> io::Result<Option<IrqReturn>> {
        if !(self.bound && self.enabled && self.armed) {
            return Ok(None);
        }
        if !self.server.recv_one(timeout)? {
            return Ok(None);
        }

        // one sentinel drained; stay disarmed until the guard runs
        self.armed = false;
        let guard = RearmGuard {
            armed: &mut self.armed,
        };
        let ret = link_change_handler(regs);
        drop(guard);

        Ok(Some(ret))
    }
}
