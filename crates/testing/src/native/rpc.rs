// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ffi::{c_char, c_int, c_void},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use vci_abi::{ErrorFFI, RpcObjectFFI, VCI_ERROR, VCI_OK};

use super::{context, dup, fail, into_obj, read, release};

#[derive(Debug, Clone)]
pub enum RpcBehaviour {
	/// Return the input unchanged.
	Echo,
	/// Return a fixed document.
	Reply(String),
	/// Fail with the given error fields.
	Fail {
		app_tag: String,
		path: String,
		info: String,
	},
}

pub struct FakeRpc {
	behaviour: RpcBehaviour,
	calls: AtomicUsize,
	frees: AtomicUsize,
}

impl FakeRpc {
	pub fn new(behaviour: RpcBehaviour) -> Arc<Self> {
		Arc::new(Self {
			behaviour,
			calls: AtomicUsize::new(0),
			frees: AtomicUsize::new(0),
		})
	}

	pub fn echo() -> Arc<Self> {
		Self::new(RpcBehaviour::Echo)
	}

	pub fn reply(output: &str) -> Arc<Self> {
		Self::new(RpcBehaviour::Reply(output.to_string()))
	}

	pub fn failing(app_tag: &str, path: &str, info: &str) -> Arc<Self> {
		Self::new(RpcBehaviour::Fail {
			app_tag: app_tag.to_string(),
			path: path.to_string(),
			info: info.to_string(),
		})
	}

	pub fn object(self: &Arc<Self>) -> RpcObjectFFI {
		RpcObjectFFI {
			obj: into_obj(self),
			call: Some(rpc_call),
			free: Some(rpc_free),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn frees(&self) -> usize {
		self.frees.load(Ordering::SeqCst)
	}
}

extern "C" fn rpc_call(obj: *mut c_void, input: *const c_char, out: *mut *mut c_char, error: *mut ErrorFFI) -> c_int {
	let rpc = unsafe { context::<FakeRpc>(obj) };
	rpc.calls.fetch_add(1, Ordering::SeqCst);
	match &rpc.behaviour {
		RpcBehaviour::Echo => {
			unsafe { *out = dup(&read(input).unwrap_or_default()) };
			VCI_OK
		}
		RpcBehaviour::Reply(output) => {
			unsafe { *out = dup(output) };
			VCI_OK
		}
		RpcBehaviour::Fail {
			app_tag,
			path,
			info,
		} => {
			fail(error, app_tag, path, info);
			VCI_ERROR
		}
	}
}

extern "C" fn rpc_free(obj: *mut c_void) {
	let rpc = unsafe { release::<FakeRpc>(obj) };
	rpc.frees.fetch_add(1, Ordering::SeqCst);
}
