// src/miner/affinity.rs
//! Best-effort CPU pinning for search threads

use core_affinity::CoreId;
use std::sync::OnceLock;

fn core_ids() -> &'static [CoreId] {
    static CORES: OnceLock<Vec<CoreId>> = OnceLock::new();
    CORES.get_or_init(|| core_affinity::get_core_ids().unwrap_or_default())
}

/// Pins the calling thread to core `index % cores`
///
/// Returns `false` when the platform exposes no cores or refuses the request;
/// callers carry on unpinned.
pub fn pin_current_thread(index: usize) -> bool {
    let cores = core_ids();
    if cores.is_empty() {
        return false;
    }
    core_affinity::set_for_current(cores[index % cores.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinning_never_panics() {
        let handle = std::thread::spawn(|| {
            // Any index is valid, including ones past the core count.
            let _ = pin_current_thread(0);
            let _ = pin_current_thread(1_000);
        });
        handle.join().unwrap();
    }
}
