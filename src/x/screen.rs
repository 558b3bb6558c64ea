//! Physical outputs as seen by the X-Server

use anyhow::Result;
use std::{fmt, thread, time::Duration};

/// An output reported by RandR
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XScreen {
    /// Output name, shared with the `bspwm` monitor
    pub(crate) name:       String,
    /// Is this the primary output?
    pub(crate) is_primary: bool,
    /// Does the output have a CRTC driving it?
    pub(crate) enabled:    bool,
    /// Is something plugged into the output?
    pub(crate) connected:  bool,
}

impl XScreen {
    /// The output is enabled and connected
    pub(crate) const fn is_on(&self) -> bool {
        self.enabled && self.connected
    }
}

impl fmt::Display for XScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<XScreen {}{}>", self.name, if self.is_primary { " (primary)" } else { "" })
    }
}

/// Something that can list the outputs of the X-Server
pub(crate) trait ScreenSource {
    /// Every output, whether it is on or not
    fn screens(&self) -> Result<Vec<XScreen>>;

    /// Outputs that are enabled and connected
    fn enabled_screens(&self) -> Result<Vec<XScreen>> {
        Ok(self.screens()?.into_iter().filter(XScreen::is_on).collect())
    }

    /// [`ScreenSource::enabled_screens`], polled every `interval` until one
    /// of them is primary
    ///
    /// The primary output lags behind a hotplug, so this never gives up
    fn enabled_screens_blocking_for_primary(&self, interval: Duration) -> Result<Vec<XScreen>> {
        loop {
            let screens = self.enabled_screens()?;
            if screens.iter().any(|s| s.is_primary) {
                return Ok(screens);
            }

            log::debug!("no primary screen yet, retrying in {:?}", interval);
            thread::sleep(interval);
        }
    }
}
