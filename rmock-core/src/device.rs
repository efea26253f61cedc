use crate::error::DeliveryError;
use crate::irq::LinkState;
use crate::regs::{RegisterBlock, Registers};

use log::debug;

/// Device-side sender half of the trigger channel. Raising is a
/// fire-and-forget send of a single sentinel byte; only its arrival
/// matters.
pub trait TriggerSender {
    fn raise(&self) -> std::io::Result<()>;
}

/// What a simulated event did on the device side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    /// The trigger was raised; carries the link state after the toggle
    Delivered(LinkState),
    /// The mask register disallows link-change interrupts, so no trigger
    /// was sent. The status bit stays pending in the register file.
    Suppressed,
}

/// Simulates one link transition on the device side.
///
/// The status bit is set strictly before the channel is signalled, so a
/// handler woken by the trigger always observes the event pending. A send
/// failure is reported as a delivery error; the register mutations made
/// before it are left in place.
pub fn simulate_link_change<B, T>(
    regs: &mut Registers<B>,
    trigger: &T,
) -> Result<LinkChange, DeliveryError>
where
    B: RegisterBlock,
    T: TriggerSender + ?Sized,
{
    regs.mark_link_change_pending();
    regs.toggle_link();

    if !regs.link_change_enabled() {
        debug!("Link-change interrupt is masked, not raising the trigger");
        return Ok(LinkChange::Suppressed);
    }

    trigger.raise().map_err(DeliveryError)?;

    let state = if regs.link_up() {
        LinkState::Up
    } else {
        LinkState::Down
    };
    Ok(LinkChange::Delivered(state))
}
