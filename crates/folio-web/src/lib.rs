//! `wasm-bindgen` exports for the hosting page.
//!
//! The session is the only process-wide state: it lives in a `thread_local!` and every
//! export borrows it for the duration of the call. Each mounted container runs on its own
//! bridge, so exports that touch one game take the container id. Page callbacks run synchronously
//! inside those calls, so a callback that calls back into an export (for example
//! unmounting from the navigation callback) is refused and logged; defer such work with
//! `setTimeout` or a microtask.

pub mod session;

pub use session::Session;

use std::cell::RefCell;

use anyhow::anyhow;
use folio_engine::{Announcement, Container, ContentType, GameConfig, GameInstance};
use wasm_bindgen::prelude::*;

thread_local! {
    static SESSION: RefCell<Option<Session>> = RefCell::new(None);
}

fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    SESSION.with(|cell| {
        let Ok(mut borrow) = cell.try_borrow_mut() else {
            log::error!("Re-entrant call into the game from a page callback; ignored");
            return None;
        };
        match borrow.as_mut() {
            Some(session) => Some(f(session)),
            None => {
                // No logger before boot().
                web_sys::console::warn_1(&JsValue::from_str("Game session not booted. Call boot() first."));
                None
            }
        }
    })
}

fn with_instance<R>(container_id: &str, f: impl FnOnce(&GameInstance) -> R) -> Option<R> {
    with_session(|s| s.host(container_id).and_then(|h| h.instance()).map(f)).flatten()
}

fn js_error(err: JsValue) -> anyhow::Error {
    anyhow!("{:?}", err)
}

/// Install logging and the panic hook, and create the session. Later calls are no-ops.
#[wasm_bindgen]
pub fn boot() {
    SESSION.with(|cell| {
        let mut session = cell.borrow_mut();
        if session.is_some() {
            return;
        }
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        *session = Some(Session::new(GameConfig::default()));
        log::info!("folio: session ready");
    });
}

/// Overlay a JSON config on the defaults for future mounts.
#[wasm_bindgen]
pub fn configure(json: &str) -> bool {
    with_session(|s| match s.configure(json) {
        Ok(()) => true,
        Err(err) => {
            log::error!("Rejected game config: {:#}", err);
            false
        }
    })
    .unwrap_or(false)
}

#[wasm_bindgen]
pub fn load_manifest(json: &str) -> bool {
    with_session(|s| match s.load_manifest(json) {
        Ok(()) => true,
        Err(err) => {
            log::error!("Rejected asset manifest: {:#}", err);
            false
        }
    })
    .unwrap_or(false)
}

/// Mount a game into the container. `on_navigate(contentType)` fires on content
/// triggers; `on_announce(message, priority)` receives screen-reader announcements.
#[wasm_bindgen]
pub fn mount(
    container_id: &str,
    width: f32,
    height: f32,
    on_navigate: js_sys::Function,
    on_announce: Option<js_sys::Function>,
) -> bool {
    let navigate = move |content: ContentType| {
        if let Err(err) = on_navigate.call1(&JsValue::NULL, &JsValue::from_str(content.as_str())) {
            log::error!("Navigation callback failed: {:?}", err);
        }
    };
    let announce = on_announce.map(|callback| {
        Box::new(move |a: &Announcement| {
            let message = JsValue::from_str(&a.message);
            let priority = JsValue::from_str(a.priority.as_str());
            if let Err(err) = callback.call2(&JsValue::NULL, &message, &priority) {
                log::error!("Announce callback failed: {:?}", err);
            }
        }) as Box<dyn Fn(&Announcement)>
    });
    let container = Container::new(container_id, width, height);
    with_session(|s| s.mount(container, navigate, announce)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn unmount(container_id: &str) -> bool {
    with_session(|s| s.unmount(container_id)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn tick(dt: f32) {
    with_session(|s| s.tick(dt));
}

// ---- Input ----

#[wasm_bindgen]
pub fn key_down(container_id: &str, key_code: u32) {
    with_session(|s| {
        if let Some(host) = s.host_mut(container_id) {
            host.push_key(key_code, true);
        }
    });
}

#[wasm_bindgen]
pub fn key_up(container_id: &str, key_code: u32) {
    with_session(|s| {
        if let Some(host) = s.host_mut(container_id) {
            host.push_key(key_code, false);
        }
    });
}

/// Touch at container-relative coordinates.
#[wasm_bindgen]
pub fn touch_start(container_id: &str, x: f32, y: f32) {
    with_session(|s| {
        if let Some(host) = s.host_mut(container_id) {
            host.touch_start(x, y);
        }
    });
}

#[wasm_bindgen]
pub fn touch_end(container_id: &str) {
    with_session(|s| {
        if let Some(host) = s.host_mut(container_id) {
            host.touch_end();
        }
    });
}

#[wasm_bindgen]
pub fn press_button(container_id: &str, button: &str) -> bool {
    with_session(|s| s.press_button(container_id, button, true)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn release_button(container_id: &str, button: &str) -> bool {
    with_session(|s| s.press_button(container_id, button, false)).unwrap_or(false)
}

// ---- Virtual button widget ----

#[wasm_bindgen]
pub fn widget_press(container_id: &str, button: &str) -> bool {
    with_session(|s| s.widget_press(container_id, button)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn widget_release(container_id: &str, button: &str) -> bool {
    with_session(|s| s.widget_release(container_id, button)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn widget_tick(dt: f32) -> u32 {
    with_session(|s| s.widget_tick(dt) as u32).unwrap_or(0)
}

// ---- Assets ----

/// Pending texture fetches as a JSON array of `{ key, path }`.
#[wasm_bindgen]
pub fn take_asset_requests(container_id: &str) -> String {
    let requests = with_session(|s| s.take_asset_requests(container_id)).unwrap_or_default();
    match serde_json::to_string(&requests) {
        Ok(json) => json,
        Err(err) => {
            log::error!("Could not encode asset requests: {}", err);
            "[]".to_string()
        }
    }
}

#[wasm_bindgen]
pub fn asset_loaded(container_id: &str, key: &str, path: &str, width: u32, height: u32) {
    with_session(|s| s.asset_loaded(container_id, key, path, width, height));
}

#[wasm_bindgen]
pub fn asset_failed(container_id: &str, key: &str, path: &str, reason: &str) {
    with_session(|s| s.asset_failed(container_id, key, path, reason));
}

// ---- Bridge listeners ----

/// Listen on a bridge channel by wire name, in every mounted container. The callback
/// receives the event name, its parsed JSON payload and the container id. Returns a
/// listener id, or 0 for an unknown channel.
#[wasm_bindgen]
pub fn subscribe(event: &str, callback: js_sys::Function) -> u32 {
    with_session(|s| {
        s.listen(event, move |container_id, e| {
            let payload = js_sys::JSON::parse(&e.payload().to_string()).map_err(js_error)?;
            callback
                .call3(
                    &JsValue::NULL,
                    &JsValue::from_str(e.name()),
                    &payload,
                    &JsValue::from_str(container_id),
                )
                .map_err(js_error)?;
            Ok(())
        })
    })
    .flatten()
    .unwrap_or(0)
}

#[wasm_bindgen]
pub fn unsubscribe(listener_id: u32) -> bool {
    with_session(|s| s.unlisten(listener_id)).unwrap_or(false)
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_sprites_ptr(container_id: &str) -> *const f32 {
    with_instance(container_id, |i| i.render_buffer().sprites_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_sprite_count(container_id: &str) -> u32 {
    with_instance(container_id, |i| i.render_buffer().sprite_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_shapes_ptr(container_id: &str) -> *const f32 {
    with_instance(container_id, |i| i.render_buffer().shapes_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_shape_count(container_id: &str) -> u32 {
    with_instance(container_id, |i| i.render_buffer().shape_count()).unwrap_or(0)
}

/// Background colour of the area on screen, `[r, g, b]` in 0..1.
#[wasm_bindgen]
pub fn theme_color(container_id: &str) -> Vec<f32> {
    with_instance(container_id, |i| i.theme().background().to_vec()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn theme_name(container_id: &str) -> Option<String> {
    with_instance(container_id, |i| i.theme().as_str().to_string())
}

#[wasm_bindgen]
pub fn loading_title(container_id: &str) -> Option<String> {
    with_instance(container_id, |i| i.loading().map(|t| t.title.clone())).flatten()
}

#[wasm_bindgen]
pub fn loading_status(container_id: &str) -> Option<String> {
    with_instance(container_id, |i| i.loading().map(|t| t.status.clone())).flatten()
}

#[wasm_bindgen]
pub fn loading_visible(container_id: &str) -> bool {
    with_session(|s| s.host(container_id).map(|h| h.view().loading_visible))
        .flatten()
        .unwrap_or(false)
}

#[wasm_bindgen]
pub fn loading_progress(container_id: &str) -> u8 {
    with_session(|s| s.host(container_id).map(|h| h.view().progress))
        .flatten()
        .unwrap_or(0)
}
