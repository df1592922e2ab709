// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Name-to-handle index over the last device enumeration.
//!
//! The native device table is authoritative. This index only saves an
//! enumeration round trip when a caller addresses a device by name; a miss
//! never means the device does not exist.

use std::collections::HashMap;
use std::time::Instant;

use crate::types::{Device, DeviceHandle};

/// Normalized device name to handle index.
#[derive(Debug, Default)]
pub struct DeviceNameCache {
    by_name: HashMap<String, DeviceHandle>,
    refreshed_at: Option<Instant>,
}

impl DeviceNameCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with a fresh enumeration.
    ///
    /// On duplicate names the lowest handle wins, since enumerations are
    /// ordered by handle.
    pub fn replace(&mut self, devices: &[Device]) {
        self.by_name.clear();
        for device in devices {
            self.by_name
                .entry(device.name.clone())
                .or_insert(device.handle);
        }
        self.refreshed_at = Some(Instant::now());
    }

    /// Looks up a handle by normalized name.
    pub fn get(&self, name: &str) -> Option<DeviceHandle> {
        self.by_name.get(name).copied()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.by_name.clear();
        self.refreshed_at = None;
    }

    /// Returns when the cache was last filled.
    pub fn refreshed_at(&self) -> Option<Instant> {
        self.refreshed_at
    }

    /// Returns the number of cached names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(handle: u32, name: &str) -> Device {
        Device {
            handle: DeviceHandle::new(handle),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_replace_and_get() {
        let mut cache = DeviceNameCache::new();
        assert!(cache.is_empty());
        assert!(cache.refreshed_at().is_none());

        cache.replace(&[device(1, "SB_3000"), device(2, "WR_21")]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("WR_21"), Some(DeviceHandle::new(2)));
        assert_eq!(cache.get("SB 3000"), None);
        assert!(cache.refreshed_at().is_some());

        cache.replace(&[device(5, "SB_3000")]);
        assert_eq!(cache.get("SB_3000"), Some(DeviceHandle::new(5)));
        assert_eq!(cache.get("WR_21"), None);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let mut cache = DeviceNameCache::new();
        cache.replace(&[device(3, "Inverter"), device(9, "Inverter")]);
        assert_eq!(cache.get("Inverter"), Some(DeviceHandle::new(3)));
    }

    #[test]
    fn test_clear() {
        let mut cache = DeviceNameCache::new();
        cache.replace(&[device(1, "a")]);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.refreshed_at().is_none());
    }
}
