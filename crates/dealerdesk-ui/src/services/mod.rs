//! Browser adapters for the DOM-free core: HTTP transport, token storage,
//! snackbar notifications, session reset, console logging, and file I/O.

pub(crate) mod browser;
pub(crate) mod files;
pub(crate) mod storage;
pub(crate) mod transport;
