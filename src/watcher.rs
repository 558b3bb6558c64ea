//! Waiting for monitors to be plugged in or unplugged

use crate::{bspc::Bspc, reconcile::Reconciler, x::screen::ScreenSource};
use anyhow::Result;
use std::{thread, time::Duration};

/// Runs one reconciliation pass per hotplug notification
#[derive(Debug)]
pub(crate) struct Watcher<'a, B, S> {
    /// Pass to run
    reconciler:   &'a Reconciler,
    /// Where commands go
    bspc:         &'a B,
    /// Where outputs are read from
    screens:      &'a S,
    /// How long to let the outputs settle after a notification
    settle_delay: Duration,
}

impl<'a, B: Bspc, S: ScreenSource> Watcher<'a, B, S> {
    /// Create a new [`Watcher`]
    pub(crate) const fn new(
        reconciler: &'a Reconciler,
        bspc: &'a B,
        screens: &'a S,
        settle_delay: Duration,
    ) -> Self {
        Self {
            reconciler,
            bspc,
            screens,
            settle_delay,
        }
    }

    /// Handle `hotplugs` one at a time until the source ends or fails
    ///
    /// A failed pass is logged and does not stop the watcher. Returns the
    /// number of passes that succeeded
    pub(crate) fn run<I>(&self, hotplugs: I) -> Result<usize>
    where
        I: IntoIterator<Item = Result<()>>,
    {
        let mut succeeded = 0_usize;
        for hotplug in hotplugs {
            hotplug?;

            // Display negotiation isn't observable, so just give it a moment
            log::info!("monitors changed, settling for {:?}", self.settle_delay);
            thread::sleep(self.settle_delay);

            match self.reconciler.run_pass(self.bspc, self.screens) {
                Ok(()) => {
                    succeeded += 1;
                    log::info!("monitors reconciled");
                },
                Err(e) => log::error!("failed to reconcile monitors: {:?}", e),
            }
        }

        Ok(succeeded)
    }
}
