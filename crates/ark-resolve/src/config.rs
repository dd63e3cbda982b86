use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use ark_types::DefinitionNaming;
use serde::{Deserialize, Serialize};

use crate::filter::DelegationConfig;

pub const BOOT: &str = "boot";
pub const LOCAL: &str = "local";
pub const DELEGATE: &str = "delegate";
pub const CURRENT: &str = "current";
pub const PARENT: &str = "parent";
pub const THREAD: &str = "thread";
pub const SYSTEM: &str = "system";
pub const COMPOSITE: &str = "composite";

/// Priority reported by the boot override. The chain consults the override
/// before its sorted scan, so the value is informational.
pub const BOOT_PRIORITY: i32 = 0;

/// Built-in scanned resolvers, in default priority order.
pub const RESOLVER_NAMES: [&str; 7] = [COMPOSITE, LOCAL, DELEGATE, CURRENT, PARENT, THREAD, SYSTEM];

// ---------------------------------------------------------------------------
// ResolverSettings
// ---------------------------------------------------------------------------

/// Live `enabled` / `priority` flags of a resolver.
///
/// Both are atomics so a shared resolver can be reconfigured between
/// lookups without exclusive access.
#[derive(Debug)]
pub struct ResolverSettings {
    enabled: AtomicBool,
    priority: AtomicI32,
}

impl ResolverSettings {
    pub fn new(enabled: bool, priority: i32) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            priority: AtomicI32::new(priority),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn priority(&self) -> i32 {
        self.priority.load(Ordering::Acquire)
    }

    pub fn set_priority(&self, priority: i32) {
        self.priority.store(priority, Ordering::Release);
    }

    /// Apply a static configuration.
    pub fn apply(&self, config: &ResolverConfig) {
        self.set_enabled(config.enabled);
        self.set_priority(config.priority);
    }
}

impl From<ResolverConfig> for ResolverSettings {
    fn from(c: ResolverConfig) -> Self {
        Self::new(c.enabled, c.priority)
    }
}

// ---------------------------------------------------------------------------
// Static configuration
// ---------------------------------------------------------------------------

/// Serializable form of [`ResolverSettings`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub enabled: bool,
    pub priority: i32,
}

impl ResolverConfig {
    pub const fn new(enabled: bool, priority: i32) -> Self {
        Self { enabled, priority }
    }
}

/// Settings for the built-in resolvers of a chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub local: ResolverConfig,
    pub delegate: ResolverConfig,
    pub current: ResolverConfig,
    pub parent: ResolverConfig,
    pub thread: ResolverConfig,
    pub system: ResolverConfig,
    pub composite: ResolverConfig,
    /// Boot override: on/off, strictness and patterns.
    pub delegation: DelegationConfig,
    pub naming: DefinitionNaming,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            local: ResolverConfig::new(true, 10),
            delegate: ResolverConfig::new(true, 15),
            current: ResolverConfig::new(true, 20),
            parent: ResolverConfig::new(true, 30),
            thread: ResolverConfig::new(false, 40),
            system: ResolverConfig::new(true, 50),
            composite: ResolverConfig::new(true, 5),
            delegation: DelegationConfig::default(),
            naming: DefinitionNaming::default(),
        }
    }
}

impl ChainConfig {
    /// Look up the settings of a built-in resolver by name.
    pub fn resolver(&self, name: &str) -> Option<&ResolverConfig> {
        match name {
            LOCAL => Some(&self.local),
            DELEGATE => Some(&self.delegate),
            CURRENT => Some(&self.current),
            PARENT => Some(&self.parent),
            THREAD => Some(&self.thread),
            SYSTEM => Some(&self.system),
            COMPOSITE => Some(&self.composite),
            _ => None,
        }
    }

    pub fn resolver_mut(&mut self, name: &str) -> Option<&mut ResolverConfig> {
        match name {
            LOCAL => Some(&mut self.local),
            DELEGATE => Some(&mut self.delegate),
            CURRENT => Some(&mut self.current),
            PARENT => Some(&mut self.parent),
            THREAD => Some(&mut self.thread),
            SYSTEM => Some(&mut self.system),
            COMPOSITE => Some(&mut self.composite),
            _ => None,
        }
    }
}
