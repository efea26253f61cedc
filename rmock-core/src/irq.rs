use crate::regs::{RegisterBlock, Registers};

use log::info;

/// Link state as read from the PHY status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Up => "UP",
            LinkState::Down => "DOWN",
        }
    }
}

/// Outcome of one handler invocation on a (possibly shared) line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// Our device raised the event and it has been acknowledged
    Handled(LinkState),
    /// The status bit was clear: another party on the shared line caused
    /// this delivery. All registers are left untouched.
    None,
}

/// The link-change interrupt handler.
///
/// Shared-line discipline: the status register decides whether this
/// delivery is ours. The acknowledge clears the status bit before the
/// handler returns, so an immediate re-invocation sees the bit clear and
/// reports `None` instead of a duplicate classification.
pub fn link_change_handler<B: RegisterBlock>(regs: &mut Registers<B>) -> IrqReturn {
    if !regs.link_change_pending() {
        return IrqReturn::None;
    }

    regs.ack_link_change();

    let state = if regs.link_up() {
        LinkState::Up
    } else {
        LinkState::Down
    };
    info!("Link status changed to {}", state.as_str());

    IrqReturn::Handled(state)
}
