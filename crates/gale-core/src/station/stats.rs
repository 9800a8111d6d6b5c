use core::fmt;

/// Counters kept by the poll loop since startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Iterations started, including ones cut short by a failure
    pub iterations: u32,
    /// Iterations where every feed accepted its value
    pub published: u32,
    /// Network resets after transient upload failures
    pub network_resets: u32,
}

impl LoopStats {
    /// Share of iterations that ended in a full upload, in percent.
    pub fn success_rate(&self) -> u8 {
        if self.iterations == 0 {
            return 100;
        }
        (u64::from(self.published) * 100 / u64::from(self.iterations)) as u8
    }
}

impl fmt::Display for LoopStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} iterations, {} published, {} network resets",
            self.iterations, self.published, self.network_resets
        )
    }
}
