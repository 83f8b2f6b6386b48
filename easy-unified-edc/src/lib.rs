/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

pub mod protocol;

use crate::protocol::{DecisionMessage, WireFormat};
use easy_unified_core::model::configuration::SchedulerConfig;
use easy_unified_core::scheduler::engine::Engine;
use log::{error, LevelFilter};
use std::sync::{Mutex, MutexGuard};

/// Everything owned between `batsim_edc_init` and `batsim_edc_deinit`: the
/// engine, the negotiated wire format, and the output buffer, which must stay
/// valid until the next `batsim_edc_take_decisions` call or deinit.
struct EdcContext {
    engine: Engine,
    format: WireFormat,
    out_buf: Vec<u8>,
}

static CONTEXT: Mutex<Option<EdcContext>> = Mutex::new(None);

fn lock_context() -> MutexGuard<'static, Option<EdcContext>> {
    CONTEXT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Initializes the decision module: resolves the wire format from `flags`,
/// parses the configuration string and installs a fresh engine.
///
/// # Safety
/// `data` must point to `size` readable bytes, or be null with `size == 0`.
#[no_mangle]
pub unsafe extern "C" fn batsim_edc_init(data: *const u8, size: u32, flags: u32) -> u8 {
    let _ = env_logger::Builder::new()
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .try_init();

    let format = match WireFormat::from_flags(flags) {
        Ok(format) => format,
        Err(err) => {
            error!("Cannot initialize: {}", err);
            return 1;
        }
    };

    let arg = if data.is_null() || size == 0 {
        ""
    } else {
        match std::str::from_utf8(std::slice::from_raw_parts(data, size as usize)) {
            Ok(arg) => arg,
            Err(_) => {
                error!("Cannot initialize: configuration string is not valid UTF-8");
                return 1;
            }
        }
    };

    let config = match SchedulerConfig::parse(arg) {
        Ok(config) => config,
        Err(err) => {
            error!("Cannot initialize: {}", err);
            return 1;
        }
    };

    *lock_context() = Some(EdcContext {
        engine: Engine::new(config),
        format,
        out_buf: Vec::new(),
    });
    0
}

/// One decision cycle: decodes the event batch, hands it to the engine and
/// encodes the decisions into a buffer owned by the module.
///
/// # Safety
/// `data` must point to `size` readable bytes, and `decisions`/`decisions_size`
/// must be valid for writes. The buffer written through `decisions` is owned by
/// the module and stays valid until the next call or deinit.
#[no_mangle]
pub unsafe extern "C" fn batsim_edc_take_decisions(
    data: *const u8,
    size: u32,
    decisions: *mut *mut u8,
    decisions_size: *mut u32,
) -> u8 {
    let mut guard = lock_context();
    let context = match guard.as_mut() {
        Some(context) => context,
        None => {
            error!("take_decisions called outside the init/deinit bracket");
            return 1;
        }
    };

    let bytes = if data.is_null() {
        &[][..]
    } else {
        std::slice::from_raw_parts(data, size as usize)
    };

    let message = match protocol::decode(context.format, bytes) {
        Ok(message) => message,
        Err(err) => {
            error!("{}", err);
            return 1;
        }
    };

    let reply = match context.engine.take_decisions(message.now, &message.events) {
        Ok(events) => DecisionMessage {
            now: message.now,
            events,
        },
        Err(err) => {
            error!("Fatal protocol violation: {}", err);
            return 1;
        }
    };

    context.out_buf = match protocol::encode(context.format, &reply) {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("{}", err);
            return 1;
        }
    };
    *decisions = context.out_buf.as_mut_ptr();
    *decisions_size = context.out_buf.len() as u32;
    0
}

/// Releases all module state. Idempotent.
#[no_mangle]
pub extern "C" fn batsim_edc_deinit() -> u8 {
    *lock_context() = None;
    0
}
