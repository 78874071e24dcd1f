/*
 * phase.rs
 * Copyright (c) 2025 Posit, PBC
 */

use bundle_config::OverridePolicy;
use bundle_dyn::Path;
use std::fmt;

/// A plugin phase. Phases always run in the order of [`Phase::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The plugin may add new entries to the collection, nothing else.
    Load,
    /// The plugin may add and modify entries but not remove them.
    Init,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Load, Phase::Init];

    /// Name passed to the plugin as `--phase`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Load => "load",
            Phase::Init => "init",
        }
    }

    /// The change policy for this phase over the collection at `root`.
    pub fn policy(&self, root: &Path) -> OverridePolicy {
        match self {
            Phase::Load => OverridePolicy::AppendOnly { root: root.clone() },
            Phase::Init => OverridePolicy::Amend { root: root.clone() },
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
