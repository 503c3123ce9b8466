use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::sync::watch;
use tracing::info;

use marquee_core::{
    AppConfig, AutoscrollProcessor, CarouselDriver, Point, ProcessorHandle, RotateContent,
    ScrollDirection, StripViewport, Viewport,
};

/// Scripted interactions for a headless run
#[derive(Debug, Default, Clone, Copy)]
pub struct Script {
    pub seconds: Option<u64>,
    pub drag_at: Option<u64>,
    pub select_at: Option<u64>,
}

/// How long the simulated selection dialog stays open
const DIALOG_SECS: u64 = 2;

pub async fn run(config: Arc<AppConfig>, script: Script) -> Result<()> {
    let motion = config.motion.clone();
    if config.carousel.items.is_empty() {
        bail!("No carousel items configured. Add some under [carousel] items in the config file.");
    }

    let items = Arc::new(Mutex::new(config.carousel.items.clone()));
    let viewport = Arc::new(Mutex::new(
        StripViewport::for_items(
            config.carousel.items.len(),
            &motion,
            config.carousel.viewport_width,
        )
        .with_offset(start_offset(motion.direction, motion.pitch())),
    ));

    let (selection_tx, mut selection_rx) = tokio::sync::mpsc::unbounded_channel();
    let rotate_items = Arc::clone(&items);
    let select_items = Arc::clone(&items);

    let processor = AutoscrollProcessor::new(&viewport, motion.clone())?
        .on_rotate(move |direction| {
            if let Ok(mut items) = rotate_items.lock() {
                items.rotate_for(direction);
                info!("Rotated content, leading item is now '{}'", items[0]);
            }
        })
        .on_select(move |index| {
            let label = select_items
                .lock()
                .ok()
                .and_then(|items| items.get(index).cloned())
                .unwrap_or_default();
            info!("You selected '{}'", label);
            let _ = selection_tx.send(index);
        });

    let (driver, handle) = CarouselDriver::new(processor);

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx_clone.send(true);
    });

    if let Some(seconds) = script.seconds {
        let shutdown_tx_clone = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            let _ = shutdown_tx_clone.send(true);
        });
    }

    if let Some(at) = script.drag_at {
        spawn_drag(handle.clone(), Arc::clone(&viewport), at, motion.pitch() / 2.0);
    }

    if let Some(at) = script.select_at {
        let handle = handle.clone();
        let viewport = Arc::clone(&viewport);
        let pitch = motion.pitch();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(at)).await;
            let index = viewport
                .lock()
                .map(|vp| vp.leading_index(pitch))
                .unwrap_or(0);
            handle.item_selected(index);
        });
    }

    // Dismiss the simulated dialog and resume, like a host would
    let dialog_handle = handle.clone();
    tokio::spawn(async move {
        while selection_rx.recv().await.is_some() {
            tokio::time::sleep(Duration::from_secs(DIALOG_SECS)).await;
            info!("Dialog dismissed, resuming");
            dialog_handle.resume();
        }
    });

    spawn_status(
        Arc::clone(&items),
        Arc::clone(&viewport),
        motion.pitch(),
        config.carousel.viewport_width,
        shutdown_rx.clone(),
    );

    println!(
        "Carousel running ({} items, {:?}, speed {}). Press Ctrl+C to stop.",
        config.carousel.items.len(),
        motion.direction,
        motion.speed
    );

    driver.run(shutdown_rx).await;
    drop(handle);

    println!("Carousel stopped.");
    Ok(())
}

/// Forward content wraps at zero, so it starts one pitch in.
pub fn start_offset(direction: ScrollDirection, pitch: f64) -> Point {
    match direction {
        ScrollDirection::Forward => Point::new(pitch, 0.0),
        ScrollDirection::Backward => Point::ZERO,
    }
}

/// Drag begins, the user nudges the strip by `nudge`, then lets go.
fn spawn_drag(handle: ProcessorHandle, viewport: Arc<Mutex<StripViewport>>, at: u64, nudge: f64) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(at)).await;
        info!("Simulated drag began");
        handle.drag_began();
        tokio::time::sleep(Duration::from_millis(500)).await;
        if let Ok(mut vp) = viewport.lock() {
            let offset = vp.content_offset();
            let moved = (offset.x + nudge).min(vp.max_offset_x());
            vp.set_content_offset(Point::new(moved, offset.y));
        }
        handle.drag_ended();
        info!("Simulated drag ended");
    });
}

fn spawn_status(
    items: Arc<Mutex<Vec<String>>>,
    viewport: Arc<Mutex<StripViewport>>,
    pitch: f64,
    viewport_width: f64,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = interval.tick() => {
                    let Ok(offset) = viewport.lock().map(|vp| vp.content_offset()) else {
                        break;
                    };
                    let Ok(items) = items.lock() else {
                        break;
                    };
                    info!(
                        offset = %format!("{:.2}", offset.x),
                        "Visible: {}",
                        visible_labels(&items, offset.x, pitch, viewport_width).join(" | ")
                    );
                }
            }
        }
    });
}

/// Labels of the cells intersecting the viewport at `offset_x`
fn visible_labels(items: &[String], offset_x: f64, pitch: f64, viewport_width: f64) -> Vec<&str> {
    if items.is_empty() || pitch <= 0.0 {
        return Vec::new();
    }
    let first = (offset_x.max(0.0) / pitch).floor() as usize;
    let last = ((offset_x.max(0.0) + viewport_width) / pitch).ceil() as usize;
    (first..last.max(first + 1))
        .filter_map(|i| items.get(i).map(String::as_str))
        .collect()
}
