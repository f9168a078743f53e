// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! A `log` backend for unit tests that records what the calling thread
//! logged.

use core::cell::RefCell;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::string::{String, ToString};
use std::sync::Once;
use std::vec::Vec;

std::thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let line = record.args().to_string();
        RECORDS.with(|r| r.borrow_mut().push((record.level(), line)));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;
static INSTALL: Once = Once::new();

/// Run `f` and return every record it logged on this thread.
///
/// Tests run on many threads at once; records are kept per thread so they
/// never see each other's output.
pub(crate) fn capture<F: FnOnce()>(f: F) -> Vec<(Level, String)> {
    INSTALL.call_once(|| {
        // Only fails if another logger got there first, which nothing in
        // this crate does.
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|r| r.borrow_mut().clear());
    f();
    RECORDS.with(|r| r.take())
}
