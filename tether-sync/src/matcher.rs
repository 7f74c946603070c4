//! Identity heuristic for pairing a registry device with an unlinked monitor
//! device: same address or same name.

use tether_core::{MonitorDevice, RegistryDevice};

pub fn is_candidate(candidate: &MonitorDevice, device: &RegistryDevice) -> bool {
    candidate.ip == device.primary_ip || candidate.hostname.as_str() == device.name
}

/// Remove and return the first candidate in `unlinked` (fetch order).
///
/// No tie-break beyond order: with an IP match and a name match on two
/// different devices, whichever comes first wins.
pub fn take_match(
    unlinked: &mut Vec<MonitorDevice>,
    device: &RegistryDevice,
) -> Option<MonitorDevice> {
    let pos = unlinked.iter().position(|c| is_candidate(c, device))?;
    Some(unlinked.remove(pos))
}
