use crate::error::{Error, Result};

/// Pins the calling thread to `cpu`.
///
/// Keeps the probe's back-to-back reads on one core, so an unsynchronized
/// counter on another core cannot show up as a regression.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn pin_to_cpu(cpu: usize) -> Result<()> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(Error::Affinity {
            cpu,
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        });
    }

    // SAFETY: cpu_set_t is a plain bitmask; zeroed is the empty set and `cpu`
    // was bounds-checked against CPU_SETSIZE above.
    let result = unsafe {
        let mut cpuset: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut cpuset);
        libc::CPU_SET(cpu, &mut cpuset);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &cpuset)
    };

    if result == 0 {
        Ok(())
    } else {
        Err(Error::Affinity {
            cpu,
            source: std::io::Error::last_os_error(),
        })
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn pin_to_cpu(cpu: usize) -> Result<()> {
    Err(Error::Affinity {
        cpu,
        source: std::io::Error::from(std::io::ErrorKind::Unsupported),
    })
}
