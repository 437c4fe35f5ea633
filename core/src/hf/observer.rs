/// What an SCF driver reports after every iteration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IterationReport {
    /// zero based
    pub iteration: usize,
    /// Electronic plus nuclear repulsion energy
    pub total_energy: f64,
    /// Difference to the total energy of the previous iteration
    pub energy_change: f64,
    /// Root mean square of the DIIS error vector, if DIIS is enabled. Unrestricted runs
    /// report the larger of the two spin channels.
    pub drms: Option<f64>,
}

/// Receives iteration diagnostics from the SCF drivers, and may ask them to stop.
pub trait ScfObserver {
    fn on_iteration(&mut self, report: &IterationReport);

    /// Checked once before every iteration. Returning `true` ends the run early; the
    /// result is then reported as not converged.
    fn should_stop(&self) -> bool {
        false
    }
}

/// Discards all diagnostics.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl ScfObserver for NoopObserver {
    fn on_iteration(&mut self, _report: &IterationReport) {}
}

/// Writes one log line per iteration, at info level when verbose and debug level
/// otherwise.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogObserver {
    pub verbose: bool,
}

impl ScfObserver for LogObserver {
    fn on_iteration(&mut self, report: &IterationReport) {
        let IterationReport {
            iteration,
            total_energy,
            energy_change,
            drms,
        } = *report;

        let level = if self.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        };

        match drms {
            Some(drms) => log::log!(
                level,
                "iteration {iteration:<4} - total energy {total_energy:18.10} Eh. delta E {energy_change:10.3e}. dRMS {drms:10.3e}"
            ),
            None => log::log!(
                level,
                "iteration {iteration:<4} - total energy {total_energy:18.10} Eh. delta E {energy_change:10.3e}"
            ),
        }
    }
}

impl<F: FnMut(&IterationReport)> ScfObserver for F {
    fn on_iteration(&mut self, report: &IterationReport) {
        self(report)
    }
}
