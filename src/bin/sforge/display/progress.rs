use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// The fixed stages of one `sforge` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Write,
}

impl Stage {
    const COUNT: usize = 2;

    fn number(self) -> usize {
        match self {
            Stage::Generate => 1,
            Stage::Write => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Generate => "Generating 3D structure",
            Stage::Write => "Writing output",
        }
    }
}

/// Stage reporting on stderr. Without a terminal nothing is drawn, but
/// stage timings are still recorded.
pub struct Progress {
    interactive: bool,
    spinner: Option<ProgressBar>,
    started: Instant,
    stage_started: Instant,
    timings: Vec<(Stage, Duration)>,
}

impl Progress {
    pub fn new(interactive: bool) -> Self {
        let now = Instant::now();
        Self {
            interactive,
            spinner: None,
            started: now,
            stage_started: now,
            timings: Vec::with_capacity(Stage::COUNT),
        }
    }

    pub fn begin(&mut self, stage: Stage) {
        self.clear_spinner();
        self.stage_started = Instant::now();
        if !self.interactive {
            return;
        }

        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner().with_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(format!("{}/{} {}", stage.number(), Stage::COUNT, stage.label()));
        self.spinner = Some(bar);
    }

    pub fn done(&mut self, stage: Stage, details: &[String]) {
        self.clear_spinner();
        let elapsed = self.stage_started.elapsed();
        self.timings.push((stage, elapsed));
        if !self.interactive {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<40} {:>6}",
            stage.label(),
            format_duration(elapsed)
        );
        for detail in details {
            let _ = writeln!(stderr, "      {detail}");
        }
    }

    /// Prints the per-stage timing summary once `output` is on disk.
    pub fn finish(mut self, output: &str) {
        self.clear_spinner();
        if !self.interactive {
            return;
        }

        let breakdown: Vec<String> = self
            .timings
            .iter()
            .map(|(stage, d)| format!("{} {}", stage.label().to_lowercase(), format_duration(*d)))
            .collect();
        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "\n  {output} ready in {} ({})\n",
            format_duration(self.started.elapsed()),
            breakdown.join(", ")
        );
    }

    fn clear_spinner(&mut self) {
        if let Some(bar) = self.spinner.take() {
            bar.finish_and_clear();
        }
    }
}

fn format_duration(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}
