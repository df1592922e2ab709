// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! [`NativeSdk`] implementation over the loaded vendor library.

use std::ffi::CString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use libloading::Library;
use sunbridge_core::sdk::{status, NativeSdk};
use sunbridge_core::types::{
    ChannelHandle, ChannelKind, ChannelValue, DeviceHandle, DriverHandle, ValueRange,
};
use tracing::{debug, warn};

use crate::buffer::{read_handles, TextBuffer};
use crate::error::{YasdiError, YasdiResult};
use crate::ffi::{Dword, YasdiApi, TRUE};

/// Default library file name.
pub const DEFAULT_LIBRARY: &str = "libyasdimaster.so";

/// Status returned by `master_initialize` when another master session is
/// already active in this process.
pub const MASTER_BUSY: i32 = -100;

/// Initial handle buffer sizes.
const DRIVER_BUFFER: usize = 10;
const DEVICE_BUFFER: usize = 50;
const CHANNEL_BUFFER: usize = 500;

/// The vendor master layer keeps global state, so only one master session
/// may exist per process.
static MASTER_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Returns `true` if a master session is active in this process.
pub fn master_active() -> bool {
    MASTER_ACTIVE.load(Ordering::Acquire)
}

/// The vendor SDK, loaded from a shared library.
pub struct YasdiSdk {
    api: YasdiApi,
    path: PathBuf,
    master_up: bool,
    // Dropped last: the function pointers in `api` point into it.
    _library: Library,
}

impl std::fmt::Debug for YasdiSdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YasdiSdk")
            .field("path", &self.path)
            .field("master_up", &self.master_up)
            .finish()
    }
}

impl YasdiSdk {
    /// Loads the vendor library and resolves its entry points.
    ///
    /// # Errors
    ///
    /// - `YasdiError::LibraryLoad` - the library cannot be opened
    /// - `YasdiError::MissingSymbol` - an entry point is missing
    pub fn load(path: impl AsRef<Path>) -> YasdiResult<Self> {
        let path = path.as_ref();

        // SAFETY: loading runs the library's initializers; the vendor library
        // has none with preconditions.
        let library = unsafe { Library::new(path) }
            .map_err(|e| YasdiError::library_load(path, e))?;

        // SAFETY: the declared signatures follow the vendor headers.
        let api = unsafe { YasdiApi::load(&library) }?;

        debug!(path = %path.display(), "Vendor library loaded");
        Ok(Self {
            api,
            path: path.to_path_buf(),
            master_up: false,
            _library: library,
        })
    }

    /// Returns the path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_text(fill: impl FnOnce(&mut TextBuffer) -> i32) -> Result<String, i32> {
        let mut buffer = TextBuffer::new();
        match fill(&mut buffer) {
            code if code >= 0 => Ok(buffer.to_string_lossy()),
            code => Err(code),
        }
    }
}

fn max_age_secs(max_age: Duration) -> Dword {
    max_age.as_secs().min(Dword::MAX as u64) as Dword
}

impl NativeSdk for YasdiSdk {
    fn name(&self) -> &str {
        "yasdi"
    }

    fn master_initialize(&mut self, config: &Path) -> (i32, u32) {
        if self.master_up
            || MASTER_ACTIVE
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            warn!("A master session is already active in this process");
            return (MASTER_BUSY, 0);
        }

        let c_path = match config.to_str().map(CString::new) {
            Some(Ok(c_path)) => c_path,
            _ => {
                warn!(config = %config.display(), "Configuration path is not representable as a C string");
                MASTER_ACTIVE.store(false, Ordering::Release);
                return (status::INVALID_ARGUMENT, 0);
            }
        };

        let mut count: Dword = 0;
        // SAFETY: `c_path` is NUL-terminated and `count` outlives the call.
        let code = unsafe { (self.api.master_initialize)(c_path.as_ptr(), &mut count) };
        self.master_up = true;
        (code, count)
    }

    fn master_shutdown(&mut self) {
        if !self.master_up {
            return;
        }
        // SAFETY: no arguments; valid after a master initialization.
        unsafe { (self.api.master_shutdown)() };
        self.master_up = false;
        MASTER_ACTIVE.store(false, Ordering::Release);
    }

    fn driver_handles(&mut self) -> Vec<DriverHandle> {
        let get_driver = self.api.get_driver;
        read_handles(DRIVER_BUFFER, |buf| {
            let len = buf.len().min(i32::MAX as usize) as i32;
            // SAFETY: `buf` holds `len` writable entries.
            unsafe { get_driver(buf.as_mut_ptr(), len) as i32 }
        })
        .into_iter()
        .map(DriverHandle::new)
        .collect()
    }

    fn driver_name(&mut self, driver: DriverHandle) -> Option<String> {
        let get_driver_name = self.api.get_driver_name;
        Self::read_text(|buf| {
            // SAFETY: the buffer is larger than the capacity passed.
            let ok = unsafe { get_driver_name(driver.raw(), buf.as_mut_ptr(), buf.capacity()) };
            if ok != 0 {
                status::OK
            } else {
                status::UNKNOWN_HANDLE
            }
        })
        .ok()
    }

    fn set_driver_online(&mut self, driver: DriverHandle) -> bool {
        // SAFETY: plain value argument.
        unsafe { (self.api.set_driver_online)(driver.raw()) != 0 }
    }

    fn set_driver_offline(&mut self, driver: DriverHandle) {
        // SAFETY: plain value argument.
        unsafe { (self.api.set_driver_offline)(driver.raw()) }
    }

    fn start_detection(&mut self, count: u32) -> i32 {
        let count = count.min(i32::MAX as u32) as i32;
        // SAFETY: plain value arguments; blocks until detection completes.
        unsafe { (self.api.start_detection)(count, TRUE) }
    }

    fn device_handles(&mut self) -> Vec<DeviceHandle> {
        let get_device_handles = self.api.get_device_handles;
        read_handles(DEVICE_BUFFER, |buf| {
            // SAFETY: `buf` holds `buf.len()` writable entries.
            unsafe { get_device_handles(buf.as_mut_ptr(), buf.len() as Dword) as i32 }
        })
        .into_iter()
        .map(DeviceHandle::new)
        .collect()
    }

    fn device_name(&mut self, device: DeviceHandle) -> Option<String> {
        let get_device_name = self.api.get_device_name;
        Self::read_text(|buf| {
            let capacity = buf.capacity() as i32;
            // SAFETY: the buffer is larger than the capacity passed.
            unsafe { get_device_name(device.raw(), buf.as_mut_ptr(), capacity) }
        })
        .ok()
    }

    fn channel_handles(&mut self, device: DeviceHandle, kind: ChannelKind) -> Vec<ChannelHandle> {
        let get_channel_handles = self.api.get_channel_handles;
        let selector = kind.as_native() as i32;
        read_handles(CHANNEL_BUFFER, |buf| {
            // SAFETY: `buf` holds `buf.len()` writable entries.
            unsafe {
                get_channel_handles(device.raw(), buf.as_mut_ptr(), buf.len() as Dword, selector)
                    as i32
            }
        })
        .into_iter()
        .map(ChannelHandle::new)
        .collect()
    }

    fn channel_name(&mut self, channel: ChannelHandle) -> Result<String, i32> {
        let get_channel_name = self.api.get_channel_name;
        Self::read_text(|buf| {
            // SAFETY: the buffer is larger than the capacity passed.
            unsafe { get_channel_name(channel.raw(), buf.as_mut_ptr(), buf.capacity()) }
        })
    }

    fn channel_unit(&mut self, channel: ChannelHandle) -> Result<String, i32> {
        let get_channel_unit = self.api.get_channel_unit;
        Self::read_text(|buf| {
            // SAFETY: the buffer is larger than the capacity passed.
            unsafe { get_channel_unit(channel.raw(), buf.as_mut_ptr(), buf.capacity()) }
        })
    }

    fn channel_value(
        &mut self,
        channel: ChannelHandle,
        device: DeviceHandle,
        max_age: Duration,
    ) -> Result<ChannelValue, i32> {
        let get_channel_value = self.api.get_channel_value;
        let mut numeric = 0.0;
        let text = Self::read_text(|buf| {
            // SAFETY: `numeric` outlives the call; the buffer is larger than
            // the capacity passed.
            unsafe {
                get_channel_value(
                    channel.raw(),
                    device.raw(),
                    &mut numeric,
                    buf.as_mut_ptr(),
                    buf.capacity(),
                    max_age_secs(max_age),
                )
            }
        })?;
        Ok(ChannelValue::new(numeric, text))
    }

    fn channel_range(&mut self, channel: ChannelHandle) -> Result<ValueRange, i32> {
        let mut min = 0.0;
        let mut max = 0.0;
        // SAFETY: both outputs outlive the call.
        let code = unsafe { (self.api.get_channel_range)(channel.raw(), &mut min, &mut max) };
        if code == status::OK {
            Ok(ValueRange::new(min, max))
        } else {
            Err(code)
        }
    }

    fn write_channel_value(&mut self, channel: ChannelHandle, device: DeviceHandle, value: f64) -> i32 {
        // SAFETY: plain value arguments.
        unsafe { (self.api.set_channel_value)(channel.raw(), device.raw(), value) }
    }
}

impl Drop for YasdiSdk {
    fn drop(&mut self) {
        if self.master_up {
            warn!(path = %self.path.display(), "Vendor library dropped with an active master, shutting down");
            self.master_shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_library() {
        let error = YasdiSdk::load("/nonexistent/libyasdimaster.so").unwrap_err();
        assert_eq!(error.error_type(), "library_load");
    }

    #[test]
    fn test_max_age_secs() {
        assert_eq!(max_age_secs(Duration::from_secs(5)), 5);
        assert_eq!(max_age_secs(Duration::from_millis(1500)), 1);
        assert_eq!(max_age_secs(Duration::from_secs(u64::MAX)), Dword::MAX);
    }
}
