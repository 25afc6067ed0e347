//! Dynamic library loading and symbol resolution
//!
//! Platform-agnostic wrapper around dlopen/LoadLibrary.

use core::ffi::c_void;
use core::ptr::NonNull;
use std::ffi::CString;

use thiserror::Error;
use tracing::debug;

/// Handle to a dynamically loaded library
pub struct Library {
    handle: NonNull<c_void>,
    name: String,
}

impl Library {
    /// Load library by name or path
    ///
    /// Bare names go through the platform's search rules.
    pub fn load(name: &str) -> Result<Self, LoadError> {
        let handle = Self::load_impl(name)?;
        debug!(target: "ffi", library = name, "library loaded");
        Ok(Self {
            handle,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(unix)]
    fn load_impl(name: &str) -> Result<NonNull<c_void>, LoadError> {
        let cname = CString::new(name).map_err(|_| LoadError::InvalidName)?;

        // SAFETY: `cname` is a valid NUL-terminated string for the call.
        let handle = unsafe { libc::dlopen(cname.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        NonNull::new(handle).ok_or_else(|| LoadError::LoadFailed(last_dl_error()))
    }

    #[cfg(windows)]
    fn load_impl(name: &str) -> Result<NonNull<c_void>, LoadError> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use winapi::um::errhandlingapi::GetLastError;
        use winapi::um::libloaderapi::LoadLibraryW;

        if name.contains('\0') {
            return Err(LoadError::InvalidName);
        }
        let wide: Vec<u16> = OsStr::new(name).encode_wide().chain(Some(0)).collect();

        // SAFETY: `wide` is NUL-terminated.
        unsafe {
            let handle = LoadLibraryW(wide.as_ptr());
            NonNull::new(handle.cast::<c_void>())
                .ok_or_else(|| LoadError::LoadFailed(format!("Error code: {}", GetLastError())))
        }
    }

    /// Address of an exported symbol
    pub fn symbol(&self, name: &str) -> Result<NonNull<c_void>, SymbolError> {
        let cname = CString::new(name).map_err(|_| SymbolError::InvalidName)?;
        self.symbol_impl(&cname)
    }

    #[cfg(unix)]
    fn symbol_impl(&self, name: &CString) -> Result<NonNull<c_void>, SymbolError> {
        // SAFETY: the handle stays open for the lifetime of `self`.
        let ptr = unsafe { libc::dlsym(self.handle.as_ptr(), name.as_ptr()) };
        NonNull::new(ptr).ok_or(SymbolError::NotFound)
    }

    #[cfg(windows)]
    fn symbol_impl(&self, name: &CString) -> Result<NonNull<c_void>, SymbolError> {
        use winapi::um::libloaderapi::GetProcAddress;

        // SAFETY: the handle stays open for the lifetime of `self`.
        let ptr = unsafe { GetProcAddress(self.handle.as_ptr().cast(), name.as_ptr()) };
        NonNull::new(ptr.cast::<c_void>()).ok_or(SymbolError::NotFound)
    }
}

impl Drop for Library {
    #[cfg(unix)]
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.handle.as_ptr());
        }
    }

    #[cfg(windows)]
    fn drop(&mut self) {
        use winapi::um::libloaderapi::FreeLibrary;
        unsafe {
            FreeLibrary(self.handle.as_ptr().cast());
        }
    }
}

// The handle is only an opaque token for dlsym/dlclose.
unsafe impl Send for Library {}
unsafe impl Sync for Library {}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library").field("name", &self.name).finish()
    }
}

#[cfg(unix)]
fn last_dl_error() -> String {
    // SAFETY: dlerror returns NULL or a NUL-terminated thread-local string.
    unsafe {
        let err = libc::dlerror();
        if err.is_null() {
            "Unknown error".into()
        } else {
            std::ffi::CStr::from_ptr(err).to_string_lossy().into_owned()
        }
    }
}

/// Library loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Invalid library name")]
    InvalidName,
    #[error("Failed to load library: {0}")]
    LoadFailed(String),
}

/// Symbol lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("Invalid symbol name")]
    InvalidName,
    #[error("Symbol not found")]
    NotFound,
}
