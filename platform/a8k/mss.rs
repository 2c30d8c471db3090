//! MSS coprocessor IPC bridge
//!
//! On SCP-enabled images core power transitions are carried out by the MSS
//! management coprocessor. Requests go through one shared mailbox: the
//! sender writes the target core, the request kind and a payload, then rings
//! a doorbell. All cores share the mailbox, so the whole
//! compose-write-ring sequence runs under a fair ticket lock.
//!
//! The coprocessor does not acknowledge requests. A send only means the
//! message was posted.

use super::regs::MailboxLayout;
use super::topology::CoreId;
use crate::drivers::RegisterAccess;
use crate::sync::TicketLock;

/// Request kinds understood by the MSS firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MssRequest {
    CpuOn = 1,
    CpuOff = 2,
    CpuSuspend = 3,
}

/// One mailbox message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MssMessage {
    pub target: CoreId,
    pub request: MssRequest,
    /// Target power state, opaque to the AP
    pub payload: u32,
}

/// Mailbox registers and the doorbell behind them
#[derive(Debug)]
struct Mailbox<R> {
    regs: R,
    layout: MailboxLayout,
}

impl<R: RegisterAccess> Mailbox<R> {
    fn post(&self, msg: &MssMessage) {
        self.regs.write32(self.layout.target(), msg.target.index() as u32);
        self.regs.write32(self.layout.request(), msg.request as u32);
        self.regs.write32(self.layout.payload(), msg.payload);
        self.regs.write32(self.layout.doorbell, MailboxLayout::DOORBELL_RING);
    }
}

/// Serialized access to the MSS mailbox
pub struct MssBridge<R> {
    mailbox: TicketLock<Mailbox<R>>,
}

impl<R: RegisterAccess> MssBridge<R> {
    pub const fn new(regs: R, layout: MailboxLayout) -> Self {
        Self {
            mailbox: TicketLock::new(Mailbox { regs, layout }),
        }
    }

    /// Post `msg` and ring the doorbell. Does not wait for the coprocessor.
    pub fn send(&self, msg: MssMessage) {
        log::trace!("MSS: {:?} for {} (payload {:#x})", msg.request, msg.target, msg.payload);
        let mailbox = self.mailbox.lock();
        mailbox.post(&msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sim::{Access, SimRegisters};
    use std::thread;

    const LAYOUT: MailboxLayout = MailboxLayout::at_default(0xF000_0000);

    fn writes(sim: &SimRegisters) -> std::vec::Vec<(usize, u32)> {
        sim.log()
            .into_iter()
            .filter_map(|access| match access {
                Access::Write(addr, value) => Some((addr, value)),
                Access::Read(..) => None,
            })
            .collect()
    }

    #[test]
    fn test_send_layout() {
        let sim = SimRegisters::new();
        let bridge = MssBridge::new(&sim, LAYOUT);

        bridge.send(MssMessage {
            target: CoreId::CPU2,
            request: MssRequest::CpuSuspend,
            payload: 2,
        });

        assert_eq!(
            writes(&sim),
            [
                (LAYOUT.target(), 2),
                (LAYOUT.request(), 3),
                (LAYOUT.payload(), 2),
                (LAYOUT.doorbell, 1 << 31),
            ]
        );
    }

    #[test]
    fn test_concurrent_senders_never_interleave() {
        const ROUNDS: usize = 200;

        let sim = SimRegisters::new();
        sim.set_yield_on_access(true);
        let bridge = MssBridge::new(&sim, LAYOUT);

        thread::scope(|s| {
            for (target, request) in [(CoreId::CPU1, MssRequest::CpuOn), (CoreId::CPU3, MssRequest::CpuOff)] {
                let bridge = &bridge;
                s.spawn(move || {
                    for round in 0..ROUNDS {
                        bridge.send(MssMessage {
                            target,
                            request,
                            payload: round as u32,
                        });
                    }
                });
            }
        });

        let log = writes(&sim);
        assert_eq!(log.len(), 2 * ROUNDS * 4);
        for msg in log.chunks(4) {
            assert_eq!(msg[0].0, LAYOUT.target());
            assert_eq!(msg[1].0, LAYOUT.request());
            assert_eq!(msg[2].0, LAYOUT.payload());
            assert_eq!(msg[3], (LAYOUT.doorbell, 1 << 31));
            match msg[0].1 {
                1 => assert_eq!(msg[1].1, MssRequest::CpuOn as u32),
                3 => assert_eq!(msg[1].1, MssRequest::CpuOff as u32),
                other => panic!("unexpected target {}", other),
            }
        }
    }
}
