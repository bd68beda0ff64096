//! Package Inspection entry point
//!
//! On wasm32 this wires the browser (refresh signal, pointer input, resize) to
//! the simulation core. Natively it runs a headless auto-pilot session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Element, KeyboardEvent, PointerEvent};

    use package_inspection::platform::{AnimationFrameDriver, PerformanceClock};
    use package_inspection::sim::Snapshot;
    use package_inspection::speed::LaneSpeedEaser;
    use package_inspection::{
        GameHandle, GestureRecognizer, LaneSizing, PointerKind, PointerSample, SimConfig,
    };

    fn viewport_width() -> f32 {
        web_sys::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|v| v.as_f64())
            .unwrap_or(1024.0) as f32
    }

    /// Config from an optional `<script id="game-config" type="application/json">`
    fn load_config(document: &web_sys::Document) -> SimConfig {
        let json = document
            .get_element_by_id("game-config")
            .and_then(|el| el.text_content());
        let mut config = match json {
            Some(json) => SimConfig::from_json(&json).unwrap_or_else(|err| {
                log::warn!("Ignoring game-config: {err}");
                SimConfig::default()
            }),
            None => SimConfig::default(),
        };
        if config.sizing.is_none() {
            config.sizing = Some(LaneSizing::from_viewport_width(viewport_width()));
        }
        if config.seed == 0 {
            config.seed = js_sys::Date::now() as u64;
        }
        config
    }

    fn sample(event: &PointerEvent) -> PointerSample {
        PointerSample {
            pointer_id: event.pointer_id(),
            kind: PointerKind::from_dom(&event.pointer_type()),
            y: event.client_y() as f32,
            time_ms: event.time_stamp(),
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(document: &web_sys::Document, snapshot: &Snapshot) {
        let fields = [
            ("#hud-safe .hud-value", snapshot.score.safe_cleared),
            ("#hud-caught .hud-value", snapshot.score.threats_caught),
            ("#hud-missed .hud-value", snapshot.score.missed_threats),
        ];
        for (selector, value) in fields {
            if let Some(el) = document.query_selector(selector).ok().flatten() {
                el.set_text_content(Some(&value.to_string()));
            }
        }
    }

    /// Hand the snapshot to `window.renderInspection(json)` if the page defines it
    fn render(snapshot: &Snapshot) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(hook) = js_sys::Reflect::get(&window, &JsValue::from_str("renderInspection")) else {
            return;
        };
        let Some(hook) = hook.dyn_ref::<js_sys::Function>() else {
            return;
        };
        match snapshot.to_json() {
            Ok(json) => {
                if let Err(err) = hook.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("renderInspection failed: {err:?}");
                }
            }
            Err(err) => log::error!("Snapshot serialization failed: {err}"),
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        log::info!("Package Inspection starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let config = load_config(&document);
        let nominal_speed = config.initial_lane_speed;
        let driver = AnimationFrameDriver::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let clock = PerformanceClock::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let handle = package_inspection::start(config, driver, clock)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        // Lane brakes while a manual inspection holds it
        {
            let handle_for_speed = handle.clone();
            let document = document.clone();
            let mut easer = LaneSpeedEaser::new(nominal_speed);
            handle.on_state_change(move |snapshot| {
                let brake = snapshot.inspecting && !snapshot.auto_pilot;
                handle_for_speed.set_lane_speed(easer.update(brake, snapshot.timestamp));
                update_hud(&document, snapshot);
                render(snapshot);
            });
        }

        if let Some(logo) = document.get_element_by_id("logo") {
            setup_logo_input(&logo, handle.clone())?;
        } else {
            log::warn!("No #logo element; gesture input disabled");
        }
        setup_keyboard(&window, handle.clone())?;
        setup_resize(&window, handle.clone())?;
        setup_teardown(&window, handle)?;

        log::info!("Package Inspection running!");
        Ok(())
    }

    fn setup_logo_input(logo: &Element, handle: GameHandle) -> Result<(), JsValue> {
        let recognizer = Rc::new(RefCell::new(GestureRecognizer::default()));

        // Pointer down (touch/pen only)
        {
            let recognizer = recognizer.clone();
            let target = logo.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                if recognizer.borrow_mut().press(sample(&event)) {
                    let _ = target.set_pointer_capture(event.pointer_id());
                }
            });
            logo.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer move - keep the page from scrolling mid-gesture
        {
            let recognizer = recognizer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                if recognizer.borrow_mut().move_to(sample(&event)) && event.cancelable() {
                    event.prevent_default();
                }
            });
            logo.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer up - classify
        {
            let recognizer = recognizer.clone();
            let handle = handle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let gesture = recognizer.borrow_mut().release(sample(&event));
                if gesture.strength() > 0.0 {
                    event.prevent_default();
                }
                handle.handle_gesture(gesture);
            });
            logo.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer cancel - discard
        {
            let recognizer = recognizer.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                recognizer.borrow_mut().cancel(event.pointer_id());
            });
            logo.add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Click - mouse path, swallowed after a recognized touch interaction
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if recognizer.borrow_mut().take_click() {
                    handle.trigger_inspect();
                }
            });
            logo.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, handle: GameHandle) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            match event.key().as_str() {
                " " | "Enter" => {
                    handle.trigger_inspect();
                }
                "a" | "A" => {
                    let enabled = !handle.snapshot().auto_pilot;
                    handle.set_auto_pilot(enabled);
                }
                _ => {}
            }
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_resize(window: &web_sys::Window, handle: GameHandle) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Err(err) = handle.resize(LaneSizing::from_viewport_width(viewport_width())) {
                log::warn!("Ignoring resize: {err}");
            }
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_teardown(window: &web_sys::Window, handle: GameHandle) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            handle.stop();
        });
        window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Package Inspection (native) starting...");
    log::info!("Native mode runs a headless auto-pilot session - use `trunk serve` for the web version");

    if let Err(err) = headless::run(std::env::args().nth(1)) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use package_inspection::platform::{ManualClock, ManualFrameDriver};
    use package_inspection::{ConfigError, LaneSizing, SimConfig, StartError};
    use thiserror::Error;

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const RUN_MS: f64 = 60_000.0;

    #[derive(Debug, Error)]
    pub enum HeadlessError {
        #[error("failed to read config: {0}")]
        Io(#[from] std::io::Error),
        #[error("failed to start: {0}")]
        Start(#[from] StartError),
    }

    /// Simulate one minute at 60 fps with auto-pilot engaged
    pub fn run(config_path: Option<String>) -> Result<(), HeadlessError> {
        let mut config = match config_path {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                SimConfig::from_json(&json).map_err(|e: ConfigError| StartError::from(e))?
            }
            None => SimConfig::default(),
        };
        if config.sizing.is_none() {
            config.sizing = Some(LaneSizing::from_viewport_width(1280.0));
        }
        config.auto_pilot = true;

        let driver = ManualFrameDriver::new();
        let clock = ManualClock::new();
        let handle = package_inspection::start(config, driver.clone(), clock.clone())?;

        let mut t = 0.0;
        while t < RUN_MS && handle.is_running() {
            clock.set(t);
            driver.fire(t);
            t += FRAME_MS;
        }
        handle.stop();

        let score = handle.snapshot().score;
        println!(
            "After {:.0}s: {} threats caught, {} missed, {} cleared safe",
            RUN_MS / 1000.0,
            score.threats_caught,
            score.missed_threats,
            score.safe_cleared
        );
        Ok(())
    }
}
