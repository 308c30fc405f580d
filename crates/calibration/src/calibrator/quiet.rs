use log::LevelFilter;

/// Caps the global log level while alive and restores it on drop.
///
/// Used around inner sampling runs, which would otherwise log every sample
/// of every outer iteration.
#[must_use = "the level is restored as soon as the guard is dropped"]
pub(crate) struct QuietLogs {
    previous: LevelFilter,
}

/// The level in effect under a `cap`, never raising `current`.
fn capped(current: LevelFilter, cap: LevelFilter) -> LevelFilter {
    current.min(cap)
}

impl QuietLogs {
    pub(crate) fn new(cap: LevelFilter) -> Self {
        let previous = log::max_level();
        log::set_max_level(capped(previous, cap));
        Self { previous }
    }
}

impl Drop for QuietLogs {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}
