//! Bring `bspwm` in line with the outputs that are actually on
//!
//! A pass runs in a fixed order:
//! 1. pad the primary monitor for the status bar
//! 2. hand out desktop layouts, primary first
//! 3. move windows off of monitors that are going away
//! 4. remove those monitors
//!
//! Windows have to be moved before their monitor is removed, otherwise
//! `bspwm` drops them

use crate::{
    bspc::Bspc,
    error::Error,
    monitor::Monitor,
    x::screen::{ScreenSource, XScreen},
};
use anyhow::{Context, Result};
use colored::Colorize;
use itertools::Itertools;
use std::time::Duration;

/// What a pass should set up
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    /// Top padding of the primary monitor, room for the status bar
    pub(crate) primary_padding: u32,
    /// Desktop names for each monitor. The first is for the primary, the
    /// rest go to the other monitors in the order `bspwm` lists them
    pub(crate) desktop_layouts: Vec<Vec<String>>,
}

// =============================== Plan ===============================

/// The commands a single pass will issue, validated up front
#[derive(Debug)]
pub(crate) struct Plan<'a> {
    /// Monitor matching the primary output
    primary:   &'a Monitor,
    /// Monitors that stay, primary first, the rest in their original order
    active:    Vec<&'a Monitor>,
    /// Monitors without an enabled output
    to_remove: Vec<&'a Monitor>,
    /// Settings used for padding and layouts
    settings:  &'a Settings,
}

impl<'a> Plan<'a> {
    /// Diff `monitors` against the enabled `screens`
    ///
    /// Nothing has been sent to `bspwm` if this fails
    pub(crate) fn new(
        monitors: &'a [Monitor],
        screens: &[XScreen],
        settings: &'a Settings,
    ) -> Result<Self, Error> {
        let (mut active, to_remove): (Vec<_>, Vec<_>) = monitors
            .iter()
            .partition(|m| screens.iter().any(|s| s.name == m.name));

        let primaries = screens.iter().filter(|s| s.is_primary).collect::<Vec<_>>();
        let primary_screen = match primaries.as_slice() {
            [screen] => *screen,
            _ => return Err(Error::PrimaryCount(primaries.len())),
        };

        let idx = active
            .iter()
            .position(|m| m.name == primary_screen.name)
            .ok_or_else(|| Error::PrimaryMonitorMissing(primary_screen.name.clone()))?;
        let primary = active.remove(idx);
        active.insert(0, primary);

        if active.len() > settings.desktop_layouts.len() {
            return Err(Error::CapacityExceeded {
                monitors: active.len(),
                layouts:  settings.desktop_layouts.len(),
            });
        }

        Ok(Self {
            primary,
            active,
            to_remove,
            settings,
        })
    }

    /// Monitor that receives the padding and the first layout
    pub(crate) const fn primary(&self) -> &'a Monitor {
        self.primary
    }

    /// Monitors that stay, primary first
    pub(crate) fn active(&self) -> &[&'a Monitor] {
        &self.active
    }

    /// Monitors that will be emptied and removed
    pub(crate) fn to_remove(&self) -> &[&'a Monitor] {
        &self.to_remove
    }

    /// Issue the commands. Stops at the first failing one; whatever was
    /// already sent stays applied
    pub(crate) fn apply<B: Bspc>(&self, bspc: &B) -> Result<()> {
        bspc.set_monitor_padding(self.primary, self.settings.primary_padding)
            .with_context(|| format!("failed to pad {}", self.primary))?;

        for (layout, monitor) in self.settings.desktop_layouts.iter().zip(&self.active) {
            bspc.set_desktop_layout(monitor, layout)
                .with_context(|| format!("failed to set desktops of {}", monitor))?;
        }

        for monitor in &self.to_remove {
            for window in monitor.windows() {
                log::info!("sending {} to {}", window, self.primary);
                bspc.send_to_monitor(window, &self.primary.name)
                    .with_context(|| format!("failed to evacuate {} from {}", window, monitor))?;
            }
        }

        for monitor in &self.to_remove {
            log::info!("removing {}", monitor);
            bspc.remove_monitor(&monitor.name)
                .with_context(|| format!("failed to remove {}", monitor))?;
        }

        Ok(())
    }
}

// ============================ Reconciler ============================

/// Runs reconciliation passes
#[derive(Debug, Clone)]
pub(crate) struct Reconciler {
    /// Padding and layouts to set up
    settings:      Settings,
    /// How long to wait between polls for a primary output
    poll_interval: Duration,
}

impl Reconciler {
    /// Create a new [`Reconciler`]
    pub(crate) const fn new(settings: Settings, poll_interval: Duration) -> Self {
        Self {
            settings,
            poll_interval,
        }
    }

    /// One full pass from fresh state
    pub(crate) fn run_pass<B: Bspc, S: ScreenSource>(&self, bspc: &B, source: &S) -> Result<()> {
        let monitors = bspc.monitors().context("failed to query bspwm monitors")?;
        log::info!(
            "{}: {}",
            "all bspwm monitors".bright_blue(),
            monitors.iter().join(", ")
        );

        let screens = source
            .enabled_screens_blocking_for_primary(self.poll_interval)
            .context("failed to list enabled screens")?;
        log::info!(
            "{}: {}",
            "enabled x screens".bright_blue(),
            screens.iter().join(", ")
        );

        let plan = Plan::new(&monitors, &screens, &self.settings)?;
        log::info!("primary monitor: {}", plan.primary());
        log::info!("active monitors: {}", plan.active().iter().join(", "));
        log::info!("monitors to be turned off: {}", plan.to_remove().iter().join(", "));

        plan.apply(bspc)
    }
}
