use raftquest_game::{
    BackgroundImage, DeferredNavigation, ImageFit, NavigationTarget, Orientation, Rect, Viewport,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlImageElement, OrientationType, Storage, Window};

/// Retrieve the global `window` object, if running in a browser.
#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Retrieve the document object for DOM interactions.
#[must_use]
pub fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .ok_or_else(|| JsValue::from_str("window unavailable"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

/// Current physical viewport, from `innerWidth`/`innerHeight`.
#[must_use]
pub fn viewport() -> Option<Viewport> {
    let win = window()?;
    let width = win.inner_width().ok()?.as_f64()?;
    let height = win.inner_height().ok()?.as_f64()?;
    Some(Viewport::new(width, height))
}

/// Device orientation. Prefers the Screen Orientation API and falls back to
/// comparing viewport extents.
#[must_use]
pub fn orientation() -> Option<Orientation> {
    let reported = window()
        .and_then(|w| w.screen().ok())
        .and_then(|screen| screen.orientation().type_().ok())
        .and_then(|kind| match kind {
            OrientationType::PortraitPrimary | OrientationType::PortraitSecondary => {
                Some(Orientation::Portrait)
            }
            OrientationType::LandscapePrimary | OrientationType::LandscapeSecondary => {
                Some(Orientation::Landscape)
            }
            _ => None,
        });
    reported.or_else(|| viewport().map(|v| Orientation::from_extents(v.width, v.height)))
}

/// Physical bounding rectangle of an element.
#[must_use]
pub fn element_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
}

/// Natural size of a loaded image, or `None` while it is still loading.
#[must_use]
pub fn background_from_image(image: &HtmlImageElement, fit: ImageFit) -> Option<BackgroundImage> {
    let (width, height) = (image.natural_width(), image.natural_height());
    (width > 0 && height > 0).then(|| BackgroundImage {
        natural_width: f64::from(width),
        natural_height: f64::from(height),
        fit,
    })
}

/// Run `on_fire` once the navigation delay elapses, unless the screen that
/// scheduled it has been torn down in the meantime.
///
/// # Errors
/// Returns an error if no window is available or the timer cannot be scheduled.
pub fn schedule_navigation<F>(navigation: DeferredNavigation, on_fire: F) -> Result<i32, JsValue>
where
    F: FnOnce(NavigationTarget) + 'static,
{
    let win = window().ok_or_else(|| JsValue::from_str("window unavailable"))?;
    let delay = i32::try_from(navigation.delay_ms()).unwrap_or(i32::MAX);
    let timeout = Closure::once(move || {
        if let Some(target) = navigation.fire() {
            on_fire(target);
        }
    });
    let handle = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        timeout.as_ref().unchecked_ref(),
        delay,
    )?;
    timeout.forget();
    Ok(handle)
}

/// `log` sink writing to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from(format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Route `log` records to the console. Later calls are ignored.
pub fn init_console_logging(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
