use crate::error::LifecycleError;
use crate::irq::IrqReturn;
use crate::regs::{RegisterBlock, Registers};
use crate::source::EventSource;

use log::{debug, warn};
use std::time::Duration;

/// Setup progresses left to right; teardown unwinds in reverse order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Uninitialized,
    Mapped,
    HandlerInstalled,
    Armed,
}

/// Owns one emulated device end to end: the mapped register file, the
/// event source and the lifecycle state machine. No process-wide state;
/// several drivers can coexist in one process.
pub struct DeviceDriver<B: RegisterBlock, S: EventSource<B>> {
    regs: Registers<B>,
    source: S,
    state: LifecycleState,
}

impl<B: RegisterBlock, S: EventSource<B>> DeviceDriver<B, S> {
    /// UNINITIALIZED -> MAPPED. Runs the fallible mapper; on failure
    /// nothing is held and the setup error is propagated.
    pub fn map<F>(mapper: F, source: S) -> Result<Self, LifecycleError>
    where
        F: FnOnce() -> std::io::Result<B>,
    {
        let block = mapper().map_err(LifecycleError::Setup)?;
        debug!("Register file mapped ({} bytes)", block.len());
        Ok(Self {
            regs: Registers::new(block),
            source,
            state: LifecycleState::Mapped,
        })
    }

    /// MAPPED -> HANDLER_INSTALLED. Link-change events are masked first so
    /// no trigger can fire before a consumer exists.
    pub fn install_handler(&mut self) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Mapped {
            return Err(LifecycleError::State(self.state));
        }

        self.regs.disable_link_change();
        self.source.bind_handler()?;
        self.state = LifecycleState::HandlerInstalled;
        Ok(())
    }

    /// HANDLER_INSTALLED -> ARMED. The mask bit is set only after the
    /// handler is installed and the line is enabled; the other order loses
    /// interrupts.
    pub fn arm(&mut self) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::HandlerInstalled {
            return Err(LifecycleError::State(self.state));
        }

        self.source.enable()?;
        self.regs.enable_link_change();
        self.state = LifecycleState::Armed;
        Ok(())
    }

    /// Convenience wrapper running all setup transitions, unwinding
    /// whatever was acquired when one of them fails
    pub fn bring_up<F>(mapper: F, source: S) -> Result<Self, LifecycleError>
    where
        F: FnOnce() -> std::io::Result<B>,
    {
        let mut driver = Self::map(mapper, source)?;

        if let Err(e) = driver.install_handler() {
            driver.tear_down();
            return Err(e);
        }
        if let Err(e) = driver.arm() {
            driver.tear_down();
            return Err(e);
        }
        Ok(driver)
    }

    /// Wait up to `timeout` for one trigger and dispatch it
    pub fn service(&mut self, timeout: Duration) -> std::io::Result<Option<IrqReturn>> {
        if self.state != LifecycleState::Armed {
            warn!("Servicing triggers in the {:?} state", self.state);
            return Ok(None);
        }
        self.source.poll(&mut self.regs, timeout)
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn registers(&self) -> &Registers<B> {
        &self.regs
    }

    /// Teardown back to UNINITIALIZED, strictly reversing setup: mask new
    /// events, uninstall the handler, unmap the register file, then release
    /// the source and whatever resource it claimed.
    pub fn tear_down(mut self) {
        if self.state == LifecycleState::Armed {
            self.regs.disable_link_change();
            self.source.disable();
        }
        if self.state >= LifecycleState::HandlerInstalled {
            self.source.unbind_handler();
        }

        let DeviceDriver { regs, source, .. } = self;
        drop(regs);
        drop(source);
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use super::*;
    use crate::regs::MemBlock;
    use std::cell::RefCell;
    use std::rc::Rc;

    type EventLog = Rc<RefCell<Vec<&'static str>>>;

    struct RecordingSource {
        events: EventLog,
        fail_bind: bool,
    }

    impl RecordingSource {
        fn new(events: &EventLog) -> Self {
            Self {
                events: Rc::clone(events),
                fail_bind: false,
            }
        }
    }

    impl EventSource<TracingBlock> for RecordingSource {
        fn bind_handler(&mut self) -> Result<(), LifecycleError> {
            if self.fail_bind {
                self.events.borrow_mut().push("bind-failed");
                return Err(LifecycleError::HandlerInstall(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "line busy",
                )));
            }
            self.events.borrow_mut().push("bind");
            Ok(())
        }

        fn unbind_handler(&mut self) {
            self.events.borrow_mut().push("unbind");
        }

        fn enable(&mut self) -> Result<(), LifecycleError> {
            self.events.borrow_mut().push("enable");
            Ok(())
        }

        fn disable(&mut self) {
            self.events.borrow_mut().push("disable");
        }

        fn poll(
            &mut self,
            _regs: &mut Registers<TracingBlock>,
            _timeout: Duration,
        ) -> std::io::Result<Option<IrqReturn>> {
            Ok(None)
        }
    }

    impl Drop for RecordingSource {
        fn drop(&mut self) {
            self.events.borrow_mut().push("release-source");
        }
    }

    // Register block whose unmap shows up in the event log
    struct TracingBlock {
        inner: MemBlock,
        events: EventLog,
    }

    impl TracingBlock {
        fn new(events: &EventLog) -> Self {
            Self {
                inner: MemBlock::new(),
                events: Rc::clone(events),
            }
        }
    }

    impl Drop for TracingBlock {
        fn drop(&mut self) {
            self.events.borrow_mut().push("unmap");
        }
    }

    impl RegisterBlock for TracingBlock {
        fn len(&self) -> usize {
            self.inner.len()
        }
        fn read8(&self, offset: u16) -> u8 {
            self.inner.read8(offset)
        }
        fn write8(&mut self, offset: u16, value: u8) {
            self.inner.write8(offset, value)
        }
        fn read16(&self, offset: u16) -> u16 {
            self.inner.read16(offset)
        }
        fn write16(&mut self, offset: u16, value: u16) {
            self.inner.write16(offset, value)
        }
    }

    #[test]
    fn setup_orders_mask_around_handler_installation() {
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let source = RecordingSource::new(&events);

        let mut driver =
            DeviceDriver::map(|| Ok(TracingBlock::new(&events)), source).unwrap();
        assert_eq!(driver.state(), LifecycleState::Mapped);

        driver.install_handler().unwrap();
        assert_eq!(driver.state(), LifecycleState::HandlerInstalled);
        // handler exists but events stay masked until armed
        assert!(!driver.registers().link_change_enabled());

        driver.arm().unwrap();
        assert_eq!(driver.state(), LifecycleState::Armed);
        assert!(driver.registers().link_change_enabled());

        assert_eq!(*events.borrow(), vec!["bind", "enable"]);
    }

    #[test]
    fn teardown_reverses_setup_and_releases_last() {
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let source = RecordingSource::new(&events);

        let driver =
            DeviceDriver::bring_up(|| Ok(TracingBlock::new(&events)), source).unwrap();
        driver.tear_down();

        assert_eq!(
            *events.borrow(),
            vec!["bind", "enable", "disable", "unbind", "unmap", "release-source"]
        );
    }

    #[test]
    fn mapping_failure_holds_nothing() {
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let source = RecordingSource::new(&events);

        let result = DeviceDriver::<TracingBlock, _>::map(
            || Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no file")),
            source,
        );
        assert!(matches!(result, Err(LifecycleError::Setup(_))));
        drop(result);

        // only the source release; no bind, no unmap of a mapping that
        // never existed
        assert_eq!(*events.borrow(), vec!["release-source"]);
    }

    #[test]
    fn bind_failure_unwinds_the_mapping() {
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let mut source = RecordingSource::new(&events);
        source.fail_bind = true;

        let result = DeviceDriver::bring_up(|| Ok(TracingBlock::new(&events)), source);
        assert!(matches!(result, Err(LifecycleError::HandlerInstall(_))));

        assert_eq!(
            *events.borrow(),
            vec!["bind-failed", "unmap", "release-source"]
        );
    }

    #[test]
    fn transitions_reject_wrong_states() {
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let source = RecordingSource::new(&events);

        let mut driver =
            DeviceDriver::map(|| Ok(TracingBlock::new(&events)), source).unwrap();
        assert!(matches!(driver.arm(), Err(LifecycleError::State(_))));

        driver.install_handler().unwrap();
        assert!(matches!(
            driver.install_handler(),
            Err(LifecycleError::State(_))
        ));
    }

    #[test]
    fn service_outside_armed_dispatches_nothing() {
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let source = RecordingSource::new(&events);

        let mut driver =
            DeviceDriver::map(|| Ok(TracingBlock::new(&events)), source).unwrap();
        let outcome = driver.service(Duration::from_millis(1)).unwrap();
        assert_eq!(outcome, None);
    }
}
