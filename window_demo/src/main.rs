//! Window demo application
//!
//! Opens a full screen window and a regular one, logs their events, and exits
//! once both have been closed. Options load from `window_demo.toml` (or the
//! path given as first argument) when present.

use ri_window::foundation::logging;
use ri_window::prelude::*;
use ri_window::window::NativeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

fn watch(window: &Window, closed: &Rc<RefCell<Vec<NativeId>>>) {
    let id = window.id();
    let title = window.title();

    let closed = Rc::clone(closed);
    window.on_event(move |event| match event {
        WindowEvent::Iconify(true) => log::info!("{}: minimize", title),
        WindowEvent::Maximize(true) => log::info!("{}: maximize", title),
        WindowEvent::Focus(true) => log::info!("{}: focused", title),
        WindowEvent::Focus(false) => log::info!("{}: relaxed", title),
        WindowEvent::Close => {
            log::info!("{}: close", title);
            closed.borrow_mut().push(id);
        }
        _ => {}
    });

    window.on_resize(|size| log::info!("Current window area is: {}", size.area()));
    window.on_move(|position| log::info!("Current window position is: {}", position));

    match window.native_handle() {
        Some(handle) => log::debug!("Native handle: {:?}", handle),
        None => log::debug!("No native handle for {:?}", id),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "window_demo.toml".to_string());
    let config = ApplicationConfig::load_or_default(&path)?;
    logging::init_with_level(&config.log_level);

    let mut context = Context::init()?;
    let gabe = config
        .window
        .builder()
        .title("Ave Gaben!")
        .display_mode(DisplayMode::FullScreen)
        .build(&mut context)?;
    let hackman = Window::new(&mut context, "Ave Hackman!", Extent2D::new(800, 600))?;

    let closed = Rc::new(RefCell::new(Vec::new()));
    let mut windows = HashMap::new();
    for window in [gabe, hackman] {
        watch(&window, &closed);
        windows.insert(window.id(), window);
    }

    let interval = config
        .event_loop
        .refresh_interval()
        .unwrap_or_else(|| context.refresh_interval());

    while !windows.is_empty() {
        context.wait_events_timeout(interval);
        for id in closed.borrow_mut().drain(..) {
            windows.remove(&id);
        }
    }

    log::info!("All windows closed");
    Ok(())
}
