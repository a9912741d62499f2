//! C FFI bindings for the IOKit power-source and registry APIs, plus the safe
//! wrappers used to turn their property dictionaries into [`RawAttributes`].

use std::mem;

use core_foundation::{
    array::{CFArray, CFArrayRef},
    base::{CFAllocatorRef, CFType, CFTypeRef, TCFType, kCFAllocatorDefault, mach_port_t},
    boolean::CFBoolean,
    dictionary::{CFDictionary, CFDictionaryRef, CFMutableDictionary, CFMutableDictionaryRef},
    number::CFNumber,
    string::CFString,
};
use libc::c_char;
use mach2::{
    kern_return::{KERN_SUCCESS, kern_return_t},
    port::MACH_PORT_NULL,
};
use tracing::{debug, warn};

use crate::error::{AcquireError, AcquireResult};
use crate::models::{AttrValue, RawAttributes, keys};

#[expect(non_camel_case_types)]
type io_object_t = mach_port_t;

type IOOptionBits = u32;

#[expect(non_upper_case_globals)]
const kIOMainPortDefault: mach_port_t = MACH_PORT_NULL;

const BATTERY_SERVICE_NAME: &str = "AppleSmartBattery\0";

// SAFETY: Bindings like this are inherently unsafe. See the IOKit and
// IOPowerSources headers for the ownership rules of each call.
#[link(name = "IOKit", kind = "framework")]
unsafe extern "C" {
    fn IOPSCopyPowerSourcesInfo() -> CFTypeRef;

    fn IOPSCopyPowerSourcesList(blob: CFTypeRef) -> CFArrayRef;

    fn IOPSGetPowerSourceDescription(blob: CFTypeRef, ps: CFTypeRef) -> CFDictionaryRef;

    fn IOServiceMatching(name: *const c_char) -> CFMutableDictionaryRef;

    fn IOServiceGetMatchingService(mainPort: mach_port_t, matching: CFDictionaryRef) -> io_object_t;

    fn IORegistryEntryCreateCFProperties(
        entry: io_object_t, properties: *mut CFMutableDictionaryRef, allocator: CFAllocatorRef,
        options: IOOptionBits,
    ) -> kern_return_t;

    fn IOObjectRelease(obj: io_object_t) -> kern_return_t;
}

/// Owned registry entry, released on drop.
#[derive(Debug)]
struct IoObject(io_object_t);

impl IoObject {
    fn properties(&self) -> AcquireResult<CFDictionary<CFString, CFType>> {
        // SAFETY: The arguments are valid, and `assume_init` is only reached once
        // the call reported success.
        unsafe {
            let mut props = mem::MaybeUninit::<CFMutableDictionaryRef>::uninit();

            let result = IORegistryEntryCreateCFProperties(
                self.0,
                props.as_mut_ptr(),
                kCFAllocatorDefault,
                0,
            );

            if result != KERN_SUCCESS {
                return Err(AcquireError::unavailable(format!(
                    "IORegistryEntryCreateCFProperties failed, error code {result}"
                )));
            }

            let props = props.assume_init();
            Ok(CFMutableDictionary::wrap_under_create_rule(props).to_immutable())
        }
    }
}

impl Drop for IoObject {
    fn drop(&mut self) {
        // SAFETY: The object was handed to us with a retain we own.
        let result = unsafe { IOObjectRelease(self.0) };
        if result != KERN_SUCCESS {
            warn!(code = result, "IOObjectRelease failed");
        }
    }
}

/// Description dictionary of the first entry in the power-source list.
pub fn power_source_attributes() -> AcquireResult<RawAttributes> {
    // SAFETY: Copy-rule call, ownership is taken by `wrap_under_create_rule`.
    let blob = unsafe { IOPSCopyPowerSourcesInfo() };
    if blob.is_null() {
        return Err(AcquireError::unavailable("IOPSCopyPowerSourcesInfo returned nothing"));
    }
    let blob = unsafe { CFType::wrap_under_create_rule(blob) };

    // SAFETY: `blob` is a live power-source snapshot.
    let list = unsafe { IOPSCopyPowerSourcesList(blob.as_CFTypeRef()) };
    if list.is_null() {
        return Err(AcquireError::unavailable("IOPSCopyPowerSourcesList returned nothing"));
    }
    let list: CFArray<CFType> = unsafe { CFArray::wrap_under_create_rule(list) };

    let first = list.get(0).ok_or(AcquireError::NoPowerSource)?;

    // SAFETY: Get-rule call on entries of the live `blob`; wrapping retains it.
    let description =
        unsafe { IOPSGetPowerSourceDescription(blob.as_CFTypeRef(), first.as_CFTypeRef()) };
    if description.is_null() {
        return Err(AcquireError::NoPowerSource);
    }
    let description: CFDictionary<CFString, CFType> =
        unsafe { CFDictionary::wrap_under_get_rule(description) };

    Ok(collect_known(&description))
}

/// Properties of the `AppleSmartBattery` registry entry. Absence is not an error.
pub fn battery_registry_attributes() -> RawAttributes {
    // SAFETY: `IOServiceMatching` returns a dictionary whose reference is consumed
    // by `IOServiceGetMatchingService`.
    let service = unsafe {
        let matching = IOServiceMatching(BATTERY_SERVICE_NAME.as_ptr().cast());
        IOServiceGetMatchingService(kIOMainPortDefault, matching as CFDictionaryRef)
    };

    if service == 0 {
        debug!(service = keys::BATTERY_SERVICE, "no matching registry entry");
        return RawAttributes::new();
    }

    match IoObject(service).properties() {
        Ok(props) => collect_known(&props),
        Err(e) => {
            debug!(error = %e, "could not read battery registry properties");
            RawAttributes::new()
        }
    }
}

fn collect_known(dict: &CFDictionary<CFString, CFType>) -> RawAttributes {
    let mut raw = RawAttributes::new();

    for key in keys::ALL {
        let cf_key = CFString::from_static_string(*key);
        let Some(value) = dict.find(&cf_key) else {
            continue;
        };
        if let Some(value) = attr_value(&value) {
            raw.insert_missing(*key, value);
        }
    }

    raw
}

fn attr_value(value: &CFType) -> Option<AttrValue> {
    if let Some(flag) = value.downcast::<CFBoolean>() {
        return Some(AttrValue::Bool(flag.into()));
    }
    if let Some(number) = value.downcast::<CFNumber>() {
        return number.to_i64().map(AttrValue::Int);
    }
    value
        .downcast::<CFString>()
        .map(|s| AttrValue::Str(s.to_string()))
}
