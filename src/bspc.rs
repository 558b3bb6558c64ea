//! Talking to `bspwm` through `bspc`

use crate::{error::Error, monitor::Monitor, tree::Node};
use anyhow::{Context, Result};
use itertools::Itertools;
use std::{path::PathBuf, process::Command};

/// The only way [`bspmon`] changes or reads the state of the window manager
///
/// Every method maps to exactly one `bspc` invocation
pub(crate) trait Bspc {
    /// Run `bspc` with the given arguments, returning trimmed stdout
    fn run(&self, args: &[String]) -> Result<String>;

    /// Run a read-only `bspc query`. Unlike [`Bspc::run`], this still runs
    /// during a dry run
    fn query(&self, args: &[String]) -> Result<String> {
        self.run(args)
    }

    /// Replace the desktops of `monitor` with `names`
    fn set_desktop_layout<S: AsRef<str>>(&self, monitor: &Monitor, names: &[S]) -> Result<()> {
        let mut args = vec![String::from("monitor"), monitor.name.clone(), String::from("-d")];
        args.extend(names.iter().map(|n| n.as_ref().to_owned()));
        self.run(&args).map(drop)
    }

    /// Set the top padding of `monitor`
    fn set_monitor_padding(&self, monitor: &Monitor, padding: u32) -> Result<()> {
        self.run(&[
            String::from("config"),
            String::from("-m"),
            monitor.name.clone(),
            String::from("top_padding"),
            padding.to_string(),
        ])
        .map(drop)
    }

    /// Send a window [`Node`] to the monitor named `monitor`
    fn send_to_monitor(&self, node: &Node, monitor: &str) -> Result<()> {
        self.run(&[
            String::from("node"),
            node.id().to_string(),
            String::from("-m"),
            monitor.to_owned(),
        ])
        .map(drop)
    }

    /// Remove the monitor named `monitor`
    fn remove_monitor(&self, monitor: &str) -> Result<()> {
        self.run(&[String::from("monitor"), monitor.to_owned(), String::from("-r")])
            .map(drop)
    }

    /// Names of every monitor `bspwm` knows about
    fn query_monitor_names(&self) -> Result<Vec<String>> {
        let output = self.query(&[
            String::from("query"),
            String::from("-M"),
            String::from("--names"),
        ])?;

        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToOwned::to_owned)
            .collect())
    }

    /// Full state of the monitor named `name`
    fn query_monitor(&self, name: &str) -> Result<Monitor> {
        let output = self.query(&[
            String::from("query"),
            String::from("-T"),
            String::from("-m"),
            name.to_owned(),
        ])?;

        serde_json::from_str(&output).map_err(|source| {
            Error::Parse {
                monitor: name.to_owned(),
                source,
            }
            .into()
        })
    }

    /// Every monitor with its desktops and windows
    fn monitors(&self) -> Result<Vec<Monitor>> {
        self.query_monitor_names()?
            .iter()
            .map(|name| self.query_monitor(name))
            .collect()
    }
}

// ============================ BspcClient ============================

/// Runs the real `bspc` binary
#[derive(Debug, Clone)]
pub(crate) struct BspcClient {
    /// Path to, or name of, the `bspc` binary
    program: PathBuf,
}

impl BspcClient {
    /// Create a new [`BspcClient`]
    pub(crate) fn new(program: Option<PathBuf>) -> Self {
        Self {
            program: program.unwrap_or_else(|| PathBuf::from("bspc")),
        }
    }
}

impl Bspc for BspcClient {
    fn run(&self, args: &[String]) -> Result<String> {
        let joined = args.iter().join(" ");
        log::info!("running bspc {}", joined);

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| Error::Command {
                args:   joined.clone(),
                reason: e.to_string(),
            })
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;

        if !output.status.success() {
            return Err(Error::Command {
                args:   joined,
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }
            .into());
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| Error::Utf8(joined))?;
        Ok(stdout.trim().to_owned())
    }
}

// ============================== DryRun ==============================

/// Log mutating commands instead of running them
#[derive(Debug, Clone)]
pub(crate) struct DryRun<B> {
    /// Used for queries
    inner: B,
}

impl<B: Bspc> DryRun<B> {
    /// Wrap `inner` so only its queries are executed
    pub(crate) const fn new(inner: B) -> Self {
        Self { inner }
    }
}

impl<B: Bspc> Bspc for DryRun<B> {
    fn run(&self, args: &[String]) -> Result<String> {
        log::info!("[dry-run] bspc {}", args.iter().join(" "));
        Ok(String::new())
    }

    fn query(&self, args: &[String]) -> Result<String> {
        self.inner.query(args)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Bspc, DryRun};
    use crate::{
        monitor::{tests::monitor_doc, Monitor},
        tree::tests::{split, window},
    };
    use anyhow::{anyhow, Result};
    use serde_json::Value;
    use std::{cell::RefCell, collections::HashMap};

    /// Fake `bspc` that serves canned queries and records every command
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        /// Documents returned by `query -T -m <name>`, in `query -M` order
        pub(crate) monitors: Vec<(String, Value)>,
        /// Every mutating command, in the order issued
        pub(crate) issued:   RefCell<Vec<String>>,
        /// Fail any command starting with this prefix
        pub(crate) fail_on:  Option<String>,
    }

    impl Recorder {
        pub(crate) fn with_monitors(monitors: Vec<(&str, Value)>) -> Self {
            Self {
                monitors: monitors
                    .into_iter()
                    .map(|(n, v)| (n.to_owned(), v))
                    .collect(),
                ..Self::default()
            }
        }

        pub(crate) fn issued(&self) -> Vec<String> {
            self.issued.borrow().clone()
        }
    }

    impl Bspc for Recorder {
        fn run(&self, args: &[String]) -> Result<String> {
            let line = args.join(" ");
            if self.fail_on.as_ref().map_or(false, |p| line.starts_with(p.as_str())) {
                return Err(anyhow!("bspc {} exited with status 1", line));
            }
            self.issued.borrow_mut().push(line);
            Ok(String::new())
        }

        fn query(&self, args: &[String]) -> Result<String> {
            let docs = self.monitors.iter().cloned().collect::<HashMap<_, _>>();
            match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
                ["query", "-M", "--names"] => Ok(self
                    .monitors
                    .iter()
                    .map(|(n, _)| n.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")),
                ["query", "-T", "-m", name] => docs
                    .get(*name)
                    .map(ToString::to_string)
                    .ok_or_else(|| anyhow!("unknown monitor {}", name)),
                other => Err(anyhow!("unexpected query {:?}", other)),
            }
        }
    }

    fn monitor(name: &str) -> Monitor {
        serde_json::from_value(monitor_doc(name, vec![])).unwrap()
    }

    #[test]
    fn command_shapes() {
        let bspc = Recorder::default();
        let node = serde_json::from_value(window(0x0040_0003, "kitty")).unwrap();

        bspc.set_desktop_layout(&monitor("eDP-1"), &["1", "2", "3"]).unwrap();
        bspc.set_monitor_padding(&monitor("eDP-1"), 42).unwrap();
        bspc.send_to_monitor(&node, "eDP-1").unwrap();
        bspc.remove_monitor("HDMI-1").unwrap();

        assert_eq!(bspc.issued(), vec![
            "monitor eDP-1 -d 1 2 3",
            "config -m eDP-1 top_padding 42",
            "node 4194307 -m eDP-1",
            "monitor HDMI-1 -r",
        ]);
    }

    #[test]
    fn monitors_are_queried_in_order() {
        let bspc = Recorder::with_monitors(vec![
            ("HDMI-1", monitor_doc("HDMI-1", vec![window(5, "a")])),
            ("eDP-1", monitor_doc("eDP-1", vec![split(1, window(2, "b"), window(3, "c"))])),
        ]);

        let monitors = bspc.monitors().unwrap();
        let names = monitors.iter().map(|m| m.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["HDMI-1", "eDP-1"]);
        assert_eq!(monitors[1].windows().count(), 2);
        // Queries are not recorded as commands
        assert!(bspc.issued().is_empty());
    }

    #[test]
    fn malformed_state_fails() {
        let bspc = Recorder::with_monitors(vec![("DP-1", serde_json::json!({ "name": "DP-1" }))]);
        let err = bspc.monitors().unwrap_err();
        assert!(err.to_string().contains("DP-1"));
    }

    #[test]
    fn dry_run_only_queries() {
        let inner = Recorder::with_monitors(vec![("eDP-1", monitor_doc("eDP-1", vec![]))]);
        let bspc = DryRun::new(inner);

        assert_eq!(bspc.monitors().unwrap().len(), 1);
        bspc.remove_monitor("eDP-1").unwrap();
        assert!(bspc.inner.issued().is_empty());
    }
}
