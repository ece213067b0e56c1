use rand::Rng;
use ringprogress::{CircularProgress, ProgressCommand, ProgressConfig};
use std::env;
use std::process;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run() {
        tracing::error!(%err, "progress demo failed");
        process::exit(1);
    }
}

fn run() -> ringprogress::Result<()> {
    // Random range unless --range x y is given
    let mut rng = rand::rng();
    let mut range = (0, rng.random_range(100..=10_000));
    let mut window_title = "Progress".to_string();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--range" {
            if let (Some(x), Some(y)) = (args.next(), args.next()) {
                if let (Ok(x), Ok(y)) = (x.parse::<i32>(), y.parse::<i32>()) {
                    range = (x.min(y), x.max(y));
                }
            }
        } else if arg == "--title" {
            if let Some(title) = args.next() {
                window_title = title;
            }
        }
    }

    let config = ProgressConfig::builder()
        .title(window_title)
        .range(range)
        .initial_value(range.0)
        .build();
    let mut progress = CircularProgress::new(config)?;

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || advance_randomly(range, &sender));

    tracing::info!(min = range.0, max = range.1, "advancing progress at random intervals");
    progress.show_with_commands(receiver)
}

/// Step the value up by a random amount every 1-5 s, then close once the
/// maximum has been shown.
fn advance_randomly((min, max): (i32, i32), sender: &Sender<ProgressCommand>) {
    let mut rng = rand::rng();
    let max_step = ((i64::from(max) - i64::from(min)) / 20).clamp(1, i64::from(i32::MAX)) as i32;
    let mut value = min;
    loop {
        thread::sleep(Duration::from_millis(rng.random_range(1000..=5000)));
        if value >= max {
            let _ = sender.send(ProgressCommand::Close);
            return;
        }
        value = value.saturating_add(rng.random_range(1..=max_step)).min(max);
        if sender.send(ProgressCommand::SetValue(value)).is_err() {
            return;
        }
    }
}
