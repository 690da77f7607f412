//! Tokio driver for [`CountdownController`].
//!
//! One task owns the controller. Intents from the presentation layer and
//! timer wake-ups are handled inside that task one at a time, so the
//! controller never needs a lock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::controller::{CountdownController, CountdownState};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::time::{Field, Time};

const EVENT_CAPACITY: usize = 64;

/// User intents forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    Stop,
    Adjust { field: Field, delta: i64 },
}

#[derive(Debug)]
enum Command {
    Intent(Intent),
    Shutdown,
}

/// What the presentation layer renders from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountdownView {
    pub time_left: Time,
    pub total_ms: u64,
    pub state: CountdownState,
    pub run_id: u64,
    pub sweep_angle: f32,
}

impl CountdownView {
    pub fn of(controller: &CountdownController) -> Self {
        Self {
            time_left: controller.time_left(),
            total_ms: controller.total_ms(),
            state: controller.state(),
            run_id: controller.run_id(),
            sweep_angle: controller.sweep_angle(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }
}

pub struct CountdownService;

impl CountdownService {
    /// Spawn the driver task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(controller: CountdownController) -> CountdownHandle {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(CountdownView::of(&controller));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let task = tokio::spawn(run(controller, command_rx, view_tx, events.clone()));

        CountdownHandle {
            commands,
            view,
            events,
            task,
        }
    }
}

/// Presentation-side handle to a running [`CountdownService`].
pub struct CountdownHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<CountdownView>,
    events: broadcast::Sender<Event>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    pub fn send(&self, intent: Intent) -> Result<()> {
        self.commands.send(Command::Intent(intent)).map_err(|_| {
            warn!(?intent, "countdown service is gone, intent dropped");
            CoreError::ServiceClosed
        })
    }

    pub fn start(&self) -> Result<()> {
        self.send(Intent::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Intent::Stop)
    }

    pub fn adjust(&self, field: Field, delta: i64) -> Result<()> {
        self.send(Intent::Adjust { field, delta })
    }

    pub fn adjust_hours(&self, delta: i64) -> Result<()> {
        self.adjust(Field::Hours, delta)
    }

    pub fn adjust_minutes(&self, delta: i64) -> Result<()> {
        self.adjust(Field::Minutes, delta)
    }

    pub fn adjust_seconds(&self, delta: i64) -> Result<()> {
        self.adjust(Field::Seconds, delta)
    }

    /// Latest published state.
    pub fn view(&self) -> CountdownView {
        *self.view.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<CountdownView> {
        self.view.clone()
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Stop the driver task and wait for it to exit.
    pub async fn shutdown(self) -> Result<()> {
        // Already gone is fine.
        let _ = self.commands.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| CoreError::Custom(format!("countdown service task failed: {e}")))
    }
}

async fn run(
    mut controller: CountdownController,
    mut commands: mpsc::UnboundedReceiver<Command>,
    view: watch::Sender<CountdownView>,
    events: broadcast::Sender<Event>,
) {
    let origin = Instant::now();
    let now_ms = || origin.elapsed().as_millis() as u64;
    info!(
        tick_interval_ms = controller.tick_interval_ms(),
        "countdown service started"
    );

    loop {
        let deadline = controller
            .next_deadline_ms()
            .map(|ms| origin + Duration::from_millis(ms));

        let published = tokio::select! {
            // Intents go first so a stop issued at a tick boundary wins.
            biased;
            command = commands.recv() => match command {
                Some(Command::Intent(intent)) => apply(&mut controller, intent, now_ms()),
                Some(Command::Shutdown) | None => break,
            },
            _ = wait_for(deadline) => controller.tick(now_ms()).into_iter().collect(),
        };

        if published.is_empty() {
            continue;
        }
        view.send_replace(CountdownView::of(&controller));
        for event in published {
            // No subscribers is not an error.
            let _ = events.send(event);
        }
    }

    info!(run_id = controller.run_id(), "countdown service stopped");
}

fn apply(controller: &mut CountdownController, intent: Intent, now_ms: u64) -> Vec<Event> {
    debug!(?intent, now_ms, "applying intent");
    match intent {
        Intent::Start => controller.start(now_ms),
        Intent::Stop => vec![controller.stop()],
        Intent::Adjust { field, delta } => vec![controller.adjust(field, delta)],
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
