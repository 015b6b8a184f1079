use std::collections::HashMap;
use std::time::Duration;

use reel_bridge::{Scheduler, TaskId};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// `setTimeout`-backed scheduler.
///
/// A single closure lives as long as the scheduler and receives the task id
/// as the timeout argument, then re-enters the runner through
/// [`crate::runner::on_timer`].
pub struct BrowserScheduler {
    window: Window,
    callback: Closure<dyn FnMut(u32)>,
    /// Browser timeout handle per pending task.
    handles: HashMap<u32, i32>,
    next_id: u32,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        let callback = Closure::<dyn FnMut(u32)>::new(|id: u32| {
            crate::runner::on_timer(TaskId(id));
        });
        Self {
            window,
            callback,
            handles: HashMap::new(),
            next_id: 0,
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&mut self, delay: Duration) -> TaskId {
        self.next_id += 1;
        let id = self.next_id;
        let timeout = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self.window.set_timeout_with_callback_and_timeout_and_arguments_1(
            self.callback.as_ref().unchecked_ref(),
            timeout,
            &JsValue::from(id),
        ) {
            Ok(handle) => {
                self.handles.insert(id, handle);
            }
            Err(e) => log::error!("timer: setTimeout failed: {e:?}"),
        }
        TaskId(id)
    }

    fn cancel(&mut self, id: TaskId) {
        if let Some(handle) = self.handles.remove(&id.0) {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn fired(&mut self, id: TaskId) {
        self.handles.remove(&id.0);
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
