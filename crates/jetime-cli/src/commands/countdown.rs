use clap::Subcommand;
use jetime_core::{
    Config, CountdownController, CountdownHandle, CountdownService, CountdownView, Event, Field,
    Time,
};
use tokio::sync::broadcast::error::RecvError;

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Dial in a duration and count it down to zero
    Run {
        #[command(flatten)]
        dial: Dial,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Print the dialled state as JSON without starting
    Preview {
        #[command(flatten)]
        dial: Dial,
    },
}

#[derive(clap::Args)]
pub struct Dial {
    /// Starting value as HH:MM:SS, MM:SS or seconds (defaults to the configured preset)
    duration: Option<String>,
    /// Hours to add to the dial
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    hours: i64,
    /// Minutes to add to the dial
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    minutes: i64,
    /// Seconds to add to the dial
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    seconds: i64,
}

impl Dial {
    fn base(&self, config: &Config) -> Result<Time, Box<dyn std::error::Error>> {
        let base = match &self.duration {
            Some(text) => text.parse::<Time>()?,
            None => config.preset(),
        };
        Ok(Time::from_millis(base.to_millis()))
    }

    /// Field adjustments in the order a user would press them.
    fn adjustments(&self) -> impl Iterator<Item = (Field, i64)> {
        [
            (Field::Hours, self.hours),
            (Field::Minutes, self.minutes),
            (Field::Seconds, self.seconds),
        ]
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
    }
}

/// Text ring: `[#######.......]` filled by the remaining share of the run.
pub fn render_ring(sweep_angle: f32, width: usize) -> String {
    let share = (sweep_angle / 360.0).clamp(0.0, 1.0);
    let filled = (share * width as f32).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn render_text(event: &Event, view: &CountdownView, config: &Config) -> Option<String> {
    let ring = |time: Time| {
        if config.display.show_ring && view.is_running() {
            format!(
                "{time}  {}",
                render_ring(view.sweep_angle, config.display.ring_width as usize)
            )
        } else {
            time.to_string()
        }
    };
    match event {
        Event::CountdownStarted { time_left, .. } | Event::CountdownTick { time_left, .. } => {
            Some(ring(*time_left))
        }
        Event::TimeAdjusted { .. } => None,
        Event::CountdownFinished { .. } => Some(format!("{}  finished", Time::default())),
        Event::CountdownStopped { .. } => Some(format!("{}  stopped", Time::default())),
        Event::StateSnapshot { time_left, .. } => Some(time_left.to_string()),
    }
}

fn apply_dial(handle: &CountdownHandle, dial: &Dial) -> Result<(), Box<dyn std::error::Error>> {
    for (field, delta) in dial.adjustments() {
        handle.adjust(field, delta)?;
    }
    Ok(())
}

async fn run_countdown(
    config: Config,
    controller: CountdownController,
    dial_spec: Dial,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = CountdownService::spawn(controller);
    let mut events = handle.subscribe();

    apply_dial(&handle, &dial_spec)?;
    handle.start()?;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if json {
                        println!("{}", serde_json::to_string(&event)?);
                    } else if let Some(line) = render_text(&event, &handle.view(), &config) {
                        println!("{line}");
                    }
                    if event.is_terminal() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "display fell behind, skipping events");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping countdown");
                handle.stop()?;
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

pub fn run(action: CountdownAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        CountdownAction::Run { dial, json } => {
            let controller = config.controller(dial.base(&config)?);
            let json = json || config.display.json;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_countdown(config, controller, dial, json))?;
        }
        CountdownAction::Preview { dial } => {
            let mut controller = config.controller(dial.base(&config)?);
            for (field, delta) in dial.adjustments() {
                controller.adjust(field, delta);
            }
            println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
        }
    }
    Ok(())
}
