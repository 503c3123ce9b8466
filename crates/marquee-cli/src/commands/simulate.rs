use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use serde::Serialize;

use marquee_core::{
    AppConfig, AutoscrollProcessor, MotionConfig, RotateContent, ScrollDirection, StripViewport,
    TickOutcome,
};

use super::run::start_offset;

/// Outcome of an offline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub ticks: u32,
    pub delta: f64,
    pub direction: ScrollDirection,
    pub final_offset: f64,
    pub wraps: u32,
    pub leading_item: Option<String>,
}

pub fn run(config: &AppConfig, ticks: u32, delta: f64, json: bool) -> Result<()> {
    let report = simulate(
        &config.motion,
        &config.carousel.items,
        config.carousel.viewport_width,
        ticks,
        delta,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Ticks:        {}", report.ticks);
        println!("Frame delta:  {}", report.delta);
        println!("Direction:    {:?}", report.direction);
        println!("Final offset: {:.3}", report.final_offset);
        println!("Wraps:        {}", report.wraps);
        if let Some(item) = &report.leading_item {
            println!("Leading item: {}", item);
        }
    }

    Ok(())
}

/// Step a processor `ticks` times with a fixed normalized delta
pub fn simulate(
    motion: &MotionConfig,
    items: &[String],
    viewport_width: f64,
    ticks: u32,
    delta: f64,
) -> Result<SimulationReport> {
    if !delta.is_finite() || delta < 0.0 {
        bail!("delta must be a non-negative number, got {}", delta);
    }
    if delta > motion.max_frame_delta {
        bail!(
            "delta {} exceeds max_frame_delta {}",
            delta,
            motion.max_frame_delta
        );
    }

    let start = start_offset(motion.direction, motion.pitch());
    let viewport = Arc::new(Mutex::new(
        StripViewport::for_items(items.len(), motion, viewport_width).with_offset(start),
    ));

    let content = Arc::new(Mutex::new(items.to_vec()));
    let rotated = Arc::clone(&content);
    let mut processor = AutoscrollProcessor::new(&viewport, motion.clone())?.on_rotate(
        move |direction| {
            if let Ok(mut items) = rotated.lock() {
                items.rotate_for(direction);
            }
        },
    );
    processor.resume();

    let mut wraps = 0u32;
    for _ in 0..ticks {
        if let TickOutcome::Wrapped { wraps: n, .. } = processor.step(delta) {
            wraps = wraps.saturating_add(n);
        }
    }

    let final_offset = processor.offset().x;
    processor.destroy();

    let leading_item = content
        .lock()
        .ok()
        .and_then(|items| items.first().cloned());

    Ok(SimulationReport {
        ticks,
        delta,
        direction: motion.direction,
        final_offset,
        wraps,
        leading_item,
    })
}
