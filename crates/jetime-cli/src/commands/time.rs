use clap::Subcommand;
use jetime_core::{Field, Time};

#[derive(Subcommand)]
pub enum TimeAction {
    /// Decompose a millisecond count into HH:MM:SS
    FromMillis {
        ms: u64,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert HH:MM:SS (or MM:SS, or seconds) to milliseconds
    ToMillis { time: String },
    /// Apply a single-field dial adjustment
    Adjust {
        /// Starting value, HH:MM:SS
        time: String,
        /// hours, minutes or seconds
        #[arg(long)]
        field: Field,
        /// Amount to add (negative to subtract)
        #[arg(long, allow_hyphen_values = true)]
        delta: i64,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

fn print_time(time: &Time, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(time)?);
    } else {
        println!("{time}");
    }
    Ok(())
}

pub fn run(action: TimeAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimeAction::FromMillis { ms, json } => print_time(&Time::from_millis(ms), json)?,
        TimeAction::ToMillis { time } => {
            let time: Time = time.parse()?;
            println!("{}", time.to_millis());
        }
        TimeAction::Adjust {
            time,
            field,
            delta,
            json,
        } => {
            let time: Time = time.parse()?;
            print_time(&time.with_delta(field, delta), json)?;
        }
    }
    Ok(())
}
