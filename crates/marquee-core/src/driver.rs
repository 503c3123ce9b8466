//! Serial execution context for an autoscroll processor
//!
//! One tokio task owns the processor. It sleeps until the earliest timer
//! deadline and receives gestures and control calls over a channel, so no
//! two entry points ever run concurrently.

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::processor::AutoscrollProcessor;
use crate::viewport::{Viewport, ViewportEvent};

/// Requests marshalled onto the driver task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Event(ViewportEvent),
    Pause,
    Resume,
    Stop,
}

/// Cloneable handle for talking to a running driver.
///
/// Calls made after the driver has stopped are dropped silently.
#[derive(Debug, Clone)]
pub struct ProcessorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ProcessorHandle {
    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            debug!(?command, "Carousel driver gone, dropping command");
        }
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Forward a viewport interaction
    pub fn notify(&self, event: ViewportEvent) {
        self.send(Command::Event(event));
    }

    pub fn drag_began(&self) {
        self.notify(ViewportEvent::DragBegan);
    }

    pub fn drag_ended(&self) {
        self.notify(ViewportEvent::DragEnded);
    }

    pub fn item_selected(&self, index: usize) {
        self.notify(ViewportEvent::ItemSelected(index));
    }

    /// Whether the driver is still accepting commands
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Owns a processor and runs its timers and commands on one task
pub struct CarouselDriver<V: Viewport> {
    processor: AutoscrollProcessor<V>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<V: Viewport> CarouselDriver<V> {
    /// Create a driver and the handle used to control it
    pub fn new(processor: AutoscrollProcessor<V>) -> (Self, ProcessorHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        (
            Self {
                processor,
                commands,
            },
            ProcessorHandle { tx },
        )
    }

    /// Run until shutdown is signalled or every handle is dropped.
    ///
    /// The processor is destroyed before this returns, so no callback fires
    /// afterwards.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            direction = ?self.processor.config().direction,
            speed = self.processor.config().speed,
            "Carousel driver started"
        );

        loop {
            let deadline = self.processor.next_deadline();

            tokio::select! {
                // Handle shutdown signal
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Carousel driver received shutdown signal");
                        break;
                    }
                }

                command = self.commands.recv() => {
                    match command {
                        Some(command) => self.apply(command),
                        None => {
                            debug!("All carousel handles dropped");
                            break;
                        }
                    }
                }

                _ = sleep_until(deadline) => {
                    self.processor.poll_timers(Instant::now());
                }
            }
        }

        self.processor.destroy();
        info!("Carousel driver stopped");
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Event(event) => self.processor.handle_event(event),
            Command::Pause => self.processor.pause(),
            Command::Resume => self.processor.resume(),
            Command::Stop => self.processor.stop(),
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
