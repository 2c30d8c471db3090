//! Early platform setup hook

use embedded_hal::delay::DelayNs;

use super::sequencer::PowerSequencer;
use super::topology::Topology;
use super::trimmer::early_cpu_powerdown;
use crate::drivers::RegisterAccess;
use crate::{Error, Result};

/// IO address decoder windows, programmed by the platform's window driver
pub trait AddressDecoder {
    fn init_windows(&mut self) -> Result<()>;
}

/// Run once on the boot core before DRAM init.
///
/// Resolves the topology, powers down every secondary core, then opens the
/// address decoder windows. Both failures are returned; the caller decides
/// whether boot can continue.
pub fn early_setup<R, D, A>(seq: &PowerSequencer<R, D>, decoder: &mut A) -> Result<Topology>
where
    R: RegisterAccess,
    D: DelayNs + Clone,
    A: AddressDecoder,
{
    let topology = Topology::probe(seq.regs(), seq.map());
    early_cpu_powerdown(seq, &topology)?;

    decoder.init_windows().map_err(|err| {
        log::error!("address decoder window setup failed: {}", err);
        Error::WindowSetup
    })?;

    Ok(topology)
}
