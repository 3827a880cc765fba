//! C ABI entry points for host runtimes (declared in `include/cyclecount.h`).
//!
//! Both return the full 64-bit value. Hosts whose native integers are
//! narrower (e.g. 63-bit tagged ints) must box the result or split it into
//! two words on their side; nothing here truncates.

use crate::counter::{read_cycles, read_cycles_serialized};

/// Unserialized counter read.
#[no_mangle]
pub extern "C" fn cyclecount_read() -> u64 {
    read_cycles()
}

/// Fenced counter read.
#[no_mangle]
pub extern "C" fn cyclecount_read_serialized() -> u64 {
    read_cycles_serialized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_entry_points_follow_the_counter() {
        let a = cyclecount_read();
        let b = read_cycles();
        let c = cyclecount_read_serialized();
        assert!(a <= b && b <= c);
    }

    #[test]
    fn test_c_entry_points_as_fn_pointers() {
        let read: extern "C" fn() -> u64 = cyclecount_read;
        let read_fenced: extern "C" fn() -> u64 = cyclecount_read_serialized;
        let a = read();
        assert!(read_fenced() >= a);
    }
}
