// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use core::ffi::{CStr, c_int};

use crate::HandleFFI;

/// Operation succeeded
pub const VCI_OK: c_int = 0;

/// Operation failed, details are in the accompanying error record
pub const VCI_ERROR: c_int = -1;

/// Handle value that is never issued; returned where a handle is expected but
/// no object could be registered
pub const VCI_INVALID_HANDLE: HandleFFI = 0;

/// App tag written into every error record the bridge produces
pub const VCI_APP_TAG_FAILURE: &CStr = c"vci-failure";
