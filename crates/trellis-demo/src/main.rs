#![forbid(unsafe_code)]

//! Trellis demo dashboard binary entry point.

mod cli;
mod logging;
mod widgets;

use std::thread;
use std::time::Duration;

use trellis::prelude::*;
use trellis::StopTrigger;

use crate::widgets::{ClickTracker, Gauge, KeyLog, Sparkline};

struct Panes {
    cpu: Arc<Gauge>,
    mem: Arc<Gauge>,
    history: Arc<Sparkline>,
}

/// A bordered pane around one gauge. `update` replaces every option of a
/// container, so the feeder rebuilds the whole pane to change its title.
fn gauge_pane(name: &str, title: impl Into<String>, gauge: &Arc<Gauge>) -> Vec<container::Opt> {
    vec![
        id(name),
        border(LineStyle::Light),
        border_title(title),
        padding_left(1),
        padding_right(1),
        place_widget(gauge.clone()),
    ]
}

fn layout(panes: &Panes) -> Vec<container::Opt> {
    vec![
        id("root"),
        border(LineStyle::Rounded),
        border_title("trellis demo - q to quit"),
        key_focus_next(KeyCode::Tab),
        key_focus_previous(KeyCode::BackTab),
        split_horizontal(
            vec![split_vertical(
                gauge_pane("cpu", "cpu", &panes.cpu),
                gauge_pane("mem", "mem", &panes.mem),
                split_percent(50),
            )],
            vec![split_horizontal(
                vec![
                    id("history"),
                    border(LineStyle::Light),
                    border_title("cpu history"),
                    align_vertical(VAlign::Bottom),
                    place_widget(panes.history.clone()),
                ],
                vec![split_vertical(
                    vec![
                        id("keys"),
                        border(LineStyle::Light),
                        border_title("keys"),
                        focused(),
                        place_widget(Arc::new(KeyLog::new(32))),
                    ],
                    vec![
                        id("clicks"),
                        border(LineStyle::Light),
                        border_title("mouse"),
                        place_widget(Arc::new(ClickTracker::new())),
                    ],
                    split_percent(50),
                )],
                split_fixed(5),
            )],
            split_fixed(5),
        ),
    ]
}

/// Pseudo-random load figures, good enough to animate the gauges.
struct Samples(u64);

impl Samples {
    fn next(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) % 101) as u8
    }
}

fn spawn_feeder(
    panes: Panes,
    container: Arc<Container>,
    stop: StopSignal,
    every: Duration,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("trellis-demo-feed".into())
        .spawn(move || {
            let mut samples = Samples(0x5eed);
            let mut cpu = 40u8;
            while !stop.wait_timeout(every) {
                // Drift instead of jumping so the history reads as a trend.
                let target = samples.next();
                cpu = if target > cpu {
                    cpu.saturating_add(7).min(target)
                } else {
                    cpu.saturating_sub(7).max(target)
                };
                panes.cpu.set(cpu);
                panes.mem.set(samples.next() / 4 + 50);
                panes.history.push(cpu);

                let pane = gauge_pane("cpu", format!("cpu {cpu}%"), &panes.cpu);
                if let Err(err) = container.update("cpu", pane) {
                    tracing::warn!(%err, "title update failed");
                }
            }
        })
}

fn quit_keys(trigger: StopTrigger) -> impl Fn(&KeyEvent) + Send + Sync + 'static {
    move |key: &KeyEvent| {
        let ctrl_c = key.code == KeyCode::Char('c') && key.ctrl();
        if key.code == KeyCode::Char('q') || ctrl_c {
            tracing::info!("quit requested");
            trigger.stop();
        }
    }
}

fn run(opts: &cli::Opts) -> trellis::Result<()> {
    let terminal = Arc::new(TtyTerminal::open(TtyOptions {
        alternate_screen: opts.alt_screen,
        mouse_capture: opts.mouse,
        ..TtyOptions::default()
    })?);

    let (stop, trigger) = StopSignal::new();
    let panes = Panes {
        cpu: Arc::new(Gauge::new(Color::GREEN)),
        mem: Arc::new(Gauge::new(Color::BLUE)),
        history: Arc::new(Sparkline::new(256)),
    };
    let config = DashboardConfig::default()
        .with_redraw_interval(Duration::from_millis(opts.redraw_ms))
        .with_keyboard_subscriber(quit_keys(trigger.clone()));

    let result = Dashboard::new(terminal.clone(), layout(&panes), config).and_then(|dashboard| {
        let feeder = spawn_feeder(
            panes,
            dashboard.container().clone(),
            stop.clone(),
            Duration::from_millis(opts.feed_ms),
        )
        .map_err(trellis::RuntimeError::Spawn)?;

        if opts.exit_after_ms > 0 {
            let trigger = trigger.clone();
            let after = Duration::from_millis(opts.exit_after_ms);
            let stop = stop.clone();
            thread::spawn(move || {
                if !stop.wait_timeout(after) {
                    trigger.stop();
                }
            });
        }

        let result = dashboard.run(&stop);
        trigger.stop();
        let _ = feeder.join();
        result
    });

    terminal.close();
    result.map_err(Into::into)
}

fn main() {
    let opts = cli::Opts::parse();
    if let Err(err) = logging::init() {
        eprintln!("Failed to open log file: {err}");
        std::process::exit(1);
    }
    tracing::info!(?opts, "starting demo");

    if let Err(err) = run(&opts) {
        tracing::error!(%err, "demo stopped");
        eprintln!("Runtime error: {err}");
        std::process::exit(1);
    }
}
