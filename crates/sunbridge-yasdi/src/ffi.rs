// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! C entry points of the vendor master library.
//!
//! Every symbol is resolved once when the library is loaded. The function
//! pointers stay valid for as long as the owning [`libloading::Library`] is
//! alive, which [`crate::YasdiSdk`] guarantees by keeping both together.

use std::os::raw::{c_char, c_double, c_int};

use libloading::Library;

use crate::error::{YasdiError, YasdiResult};

/// `DWORD` in the vendor headers.
pub type Dword = u32;

/// `BOOL` in the vendor headers.
pub type Bool = c_int;

/// `TRUE` in the vendor headers.
pub const TRUE: Bool = 1;

type MasterInitializeFn = unsafe extern "C" fn(*const c_char, *mut Dword) -> c_int;
type MasterShutdownFn = unsafe extern "C" fn();
type GetDriverFn = unsafe extern "C" fn(*mut Dword, c_int) -> Dword;
type GetDriverNameFn = unsafe extern "C" fn(Dword, *mut c_char, Dword) -> Bool;
type SetDriverOnlineFn = unsafe extern "C" fn(Dword) -> Bool;
type SetDriverOfflineFn = unsafe extern "C" fn(Dword);
type StartDetectionFn = unsafe extern "C" fn(c_int, Bool) -> c_int;
type GetDeviceHandlesFn = unsafe extern "C" fn(*mut Dword, Dword) -> Dword;
type GetDeviceNameFn = unsafe extern "C" fn(Dword, *mut c_char, c_int) -> c_int;
type GetChannelHandlesFn = unsafe extern "C" fn(Dword, *mut Dword, Dword, c_int) -> Dword;
type GetChannelTextFn = unsafe extern "C" fn(Dword, *mut c_char, Dword) -> c_int;
type GetChannelValueFn =
    unsafe extern "C" fn(Dword, Dword, *mut c_double, *mut c_char, Dword, Dword) -> c_int;
type GetChannelRangeFn = unsafe extern "C" fn(Dword, *mut c_double, *mut c_double) -> c_int;
type SetChannelValueFn = unsafe extern "C" fn(Dword, Dword, c_double) -> c_int;

/// Resolved entry points.
#[derive(Clone, Copy)]
pub struct YasdiApi {
    pub(crate) master_initialize: MasterInitializeFn,
    pub(crate) master_shutdown: MasterShutdownFn,
    pub(crate) get_driver: GetDriverFn,
    pub(crate) get_driver_name: GetDriverNameFn,
    pub(crate) set_driver_online: SetDriverOnlineFn,
    pub(crate) set_driver_offline: SetDriverOfflineFn,
    pub(crate) start_detection: StartDetectionFn,
    pub(crate) get_device_handles: GetDeviceHandlesFn,
    pub(crate) get_device_name: GetDeviceNameFn,
    pub(crate) get_channel_handles: GetChannelHandlesFn,
    pub(crate) get_channel_name: GetChannelTextFn,
    pub(crate) get_channel_unit: GetChannelTextFn,
    pub(crate) get_channel_value: GetChannelValueFn,
    pub(crate) get_channel_range: GetChannelRangeFn,
    pub(crate) set_channel_value: SetChannelValueFn,
}

/// Names of every entry point the binding needs.
pub const REQUIRED_SYMBOLS: &[&str] = &[
    "yasdiMasterInitialize",
    "yasdiMasterShutdown",
    "yasdiMasterGetDriver",
    "yasdiGetDriverName",
    "yasdiSetDriverOnline",
    "yasdiSetDriverOffline",
    "DoStartDeviceDetection",
    "GetDeviceHandles",
    "GetDeviceName",
    "GetChannelHandlesEx",
    "GetChannelName",
    "GetChannelUnit",
    "GetChannelValue",
    "GetChannelValRange",
    "SetChannelValue",
];

/// Copies one function pointer out of the library.
///
/// # Safety
///
/// `T` must match the C signature of `symbol`.
unsafe fn resolve<T: Copy>(library: &Library, symbol: &'static str) -> YasdiResult<T> {
    // SAFETY: the caller guarantees that `T` matches the exported signature.
    let symbol_ref = unsafe { library.get::<T>(symbol.as_bytes()) }
        .map_err(|e| YasdiError::missing_symbol(symbol, e))?;
    Ok(*symbol_ref)
}

impl YasdiApi {
    /// Resolves every entry point.
    ///
    /// # Safety
    ///
    /// `library` must be the vendor master library, whose exports match the
    /// signatures declared in this module.
    pub unsafe fn load(library: &Library) -> YasdiResult<Self> {
        unsafe {
            Ok(Self {
                master_initialize: resolve(library, "yasdiMasterInitialize")?,
                master_shutdown: resolve(library, "yasdiMasterShutdown")?,
                get_driver: resolve(library, "yasdiMasterGetDriver")?,
                get_driver_name: resolve(library, "yasdiGetDriverName")?,
                set_driver_online: resolve(library, "yasdiSetDriverOnline")?,
                set_driver_offline: resolve(library, "yasdiSetDriverOffline")?,
                start_detection: resolve(library, "DoStartDeviceDetection")?,
                get_device_handles: resolve(library, "GetDeviceHandles")?,
                get_device_name: resolve(library, "GetDeviceName")?,
                get_channel_handles: resolve(library, "GetChannelHandlesEx")?,
                get_channel_name: resolve(library, "GetChannelName")?,
                get_channel_unit: resolve(library, "GetChannelUnit")?,
                get_channel_value: resolve(library, "GetChannelValue")?,
                get_channel_range: resolve(library, "GetChannelValRange")?,
                set_channel_value: resolve(library, "SetChannelValue")?,
            })
        }
    }
}

impl std::fmt::Debug for YasdiApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YasdiApi")
            .field("symbols", &REQUIRED_SYMBOLS.len())
            .finish()
    }
}
