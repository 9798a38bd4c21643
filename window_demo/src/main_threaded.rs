//! Window demo with a dedicated window thread
//!
//! The main thread never touches GLFW: it asks the window thread for two
//! windows, reacts to the forwarded events, and destroys each window when the
//! user closes it.

use ri_window::foundation::logging;
use ri_window::prelude::*;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "window_demo.toml".to_string());
    let config = ApplicationConfig::load_or_default(&path)?;
    logging::init_with_level(&config.log_level);

    let thread = WindowThread::spawn(config.event_loop.clone(), Context::init)?;
    log::info!("Window thread polling every {:?}", thread.poll_interval());

    // Both requests are in flight at once
    let gabe = thread.request_window(
        config
            .window
            .builder()
            .title("Ave Gaben!")
            .display_mode(DisplayMode::FullScreen),
    )?;
    let hackman = thread.request_window(
        WindowBuilder::new()
            .title("Ave Hackman!")
            .size(Extent2D::new(800, 600)),
    )?;

    let timeout = config.event_loop.request_timeout();
    let mut open = vec![gabe.wait(timeout)?, hackman.wait(timeout)?];

    while !open.is_empty() {
        let Ok((id, event)) = thread.events().recv_timeout(Duration::from_secs(1)) else {
            continue;
        };

        match event {
            WindowEvent::Close => {
                let title = thread.with_window(id, |window| window.title())?;
                log::info!("{}: close", title);
                thread.destroy_window(id)?;
                open.retain(|open_id| *open_id != id);
            }
            WindowEvent::Resize(size) => log::info!("Current window area is: {}", size.area()),
            WindowEvent::Move(position) => log::info!("Current window position is: {}", position),
            other => log::debug!("{:?}: {:?}", id, other),
        }
    }

    thread.shutdown();
    log::info!("All windows closed");
    Ok(())
}
