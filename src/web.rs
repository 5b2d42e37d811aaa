//! Browser bindings: canvas-backed decoding and the JavaScript entry points.

use image::RgbaImage;
use image::imageops::FilterType;
use js_sys::{Array, Function, Object};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    HtmlInputElement, HtmlTextAreaElement, KeyboardEvent, Window,
};

use crate::decoder::{ImageDecoder, ImageSource, render_square};
use crate::error::{ExtractError, Result};
use crate::extract::{DEFAULT_COLOR_COUNT, ExtractOptions, extract};
use crate::shortcuts::{KeyEvent, Shortcuts};

/// Decodes through an `<img>` element and reads pixels back from a `<canvas>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasDecoder;

impl ImageDecoder for CanvasDecoder {
    fn is_headless(&self) -> bool {
        document().is_none()
    }

    async fn decode(&self, source: &ImageSource, size: u32) -> Result<RgbaImage> {
        let src = match source {
            ImageSource::Url(url) => url,
            ImageSource::Bytes(bytes) => {
                let image = image::load_from_memory(bytes)?;
                return Ok(render_square(&image, size, FilterType::Triangle));
            }
            ImageSource::Path(path) => {
                return Err(ExtractError::Load(format!(
                    "{}: local paths are not readable from a browser",
                    path.display()
                )));
            }
        };

        let document = document().ok_or_else(|| ExtractError::Render("no document".into()))?;
        let img = load_image(&document, src).await?;

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(render_error)?
            .dyn_into()
            .map_err(|_| ExtractError::Render("created element is not a canvas".into()))?;
        canvas.set_width(size);
        canvas.set_height(size);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(render_error)?
            .ok_or_else(|| ExtractError::Render("could not get canvas context".into()))?
            .dyn_into()
            .map_err(|_| ExtractError::Render("could not get canvas context".into()))?;

        let side = f64::from(size);
        ctx.draw_image_with_html_image_element_and_dw_and_dh(&img, 0.0, 0.0, side, side)
            .map_err(render_error)?;

        // Throws a SecurityError when a cross-origin image tainted the canvas.
        let data = ctx
            .get_image_data(0.0, 0.0, side, side)
            .map_err(|e| ExtractError::Load(describe(&e)))?;

        RgbaImage::from_raw(data.width(), data.height(), data.data().0)
            .ok_or_else(|| ExtractError::Render("image data has an unexpected length".into()))
    }
}

fn window() -> Option<Window> {
    web_sys::window()
}

fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

/// Resolve once the element fires `load`, reject on `error`.
async fn load_image(document: &Document, src: &str) -> Result<HtmlImageElement> {
    let img: HtmlImageElement = document
        .create_element("img")
        .map_err(render_error)?
        .dyn_into()
        .map_err(|_| ExtractError::Render("created element is not an image".into()))?;
    img.set_cross_origin(Some("anonymous"));

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        img.set_onload(Some(&resolve));
        img.set_onerror(Some(&reject));
    });
    img.set_src(src);

    let loaded = JsFuture::from(promise).await;
    img.set_onload(None);
    img.set_onerror(None);
    if loaded.is_err() {
        let shown = ImageSource::Url(src.to_owned());
        return Err(ExtractError::Load(format!("failed to load {shown}")));
    }

    Ok(img)
}

fn render_error(value: JsValue) -> ExtractError {
    ExtractError::Render(describe(&value))
}

fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn options_for(color_count: Option<i32>) -> ExtractOptions {
    match color_count {
        Some(count) => ExtractOptions::default().color_count(i64::from(count)),
        None => ExtractOptions::default(),
    }
}

/// Extract the most prominent colors of the image at `image_src`.
///
/// Resolves to an array of `#rrggbb` strings, most frequent first, and to an
/// empty array outside a browser window. Rejects when the image cannot be
/// loaded or drawn.
#[wasm_bindgen(js_name = extractColorsFromImage)]
pub async fn extract_colors_from_image(
    image_src: String,
    color_count: Option<i32>,
) -> std::result::Result<Array, JsError> {
    let options = options_for(color_count);
    let colors = extract(&CanvasDecoder, &ImageSource::Url(image_src), &options).await?;
    Ok(colors.iter().map(|c| JsValue::from_str(c)).collect())
}

/// Synchronous variant for encoded image bytes already in memory.
#[wasm_bindgen(js_name = extractColorsFromBytes)]
pub fn extract_colors_from_bytes_js(
    input: Vec<u8>,
    color_count: Option<i32>,
) -> std::result::Result<Vec<String>, JsError> {
    let count = color_count.map_or(DEFAULT_COLOR_COUNT as i64, i64::from);
    Ok(crate::extract_colors_from_bytes(&input, count)?)
}

/// Route `log` records to the browser console.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    // A second call finds the logger already installed.
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Window-level keydown listener dispatching to named callbacks.
///
/// ```js
/// const shortcuts = new KeyboardShortcuts({ "ctrl+z": undo, "alt+c": clear, b: brush });
/// // later
/// shortcuts.free();
/// ```
#[wasm_bindgen]
pub struct KeyboardShortcuts {
    window: Window,
    listener: Closure<dyn FnMut(KeyboardEvent)>,
}

#[wasm_bindgen]
impl KeyboardShortcuts {
    #[wasm_bindgen(constructor)]
    pub fn new(callbacks: &Object) -> std::result::Result<KeyboardShortcuts, JsValue> {
        let window = window().ok_or_else(|| JsValue::from_str("No window"))?;

        let mut shortcuts = Shortcuts::new();
        for entry in Object::entries(callbacks).iter() {
            let pair: Array = entry.unchecked_into();
            let Some(key) = pair.get(0).as_string() else {
                continue;
            };
            let callback: Function = pair
                .get(1)
                .dyn_into()
                .map_err(|_| JsValue::from_str(&format!("Shortcut {key:?} is not a function")))?;
            shortcuts.insert(&key, move || {
                // Rethrow so the exception surfaces from the keydown listener.
                if let Err(e) = callback.call0(&JsValue::NULL) {
                    wasm_bindgen::throw_val(e);
                }
            });
        }

        let listener = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let outcome = shortcuts.dispatch(&key_event(&event));
            if outcome.prevent_default {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);

        window.add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref())?;
        Ok(KeyboardShortcuts { window, listener })
    }
}

impl Drop for KeyboardShortcuts {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("keydown", self.listener.as_ref().unchecked_ref());
    }
}

fn key_event(event: &KeyboardEvent) -> KeyEvent {
    let editable_target = event.target().is_some_and(|target| {
        target.is_instance_of::<HtmlInputElement>()
            || target.is_instance_of::<HtmlTextAreaElement>()
            || target
                .dyn_ref::<HtmlElement>()
                .is_some_and(HtmlElement::is_content_editable)
    });

    KeyEvent {
        key: event.key(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        editable_target,
    }
}
