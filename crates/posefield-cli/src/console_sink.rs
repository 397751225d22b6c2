//! Console render sink.
//!
//! A stand-in for the real 3D renderer: consumes per-frame draw records and
//! prints a per-device summary once a second. Uncalibrated devices show in
//! red, faded (stale) devices are dimmed: the same presentation cues the
//! real renderer derives from `fade_alpha` and `uncalibrated`.

use colored::Colorize;
use posefield_runtime::RenderSink;
use posefield_types::DrawRecord;

/// Prints every `report_every`-th frame to stdout.
pub struct ConsoleSink {
    report_every: u64,
    frames: u64,
}

impl ConsoleSink {
    pub fn new(report_every: u64) -> Self {
        Self {
            report_every: report_every.max(1),
            frames: 0,
        }
    }

    fn print_frame(&self, frame: &[DrawRecord]) {
        println!(
            "{} frame {} · {} device(s)",
            "▸".cyan(),
            self.frames,
            frame.len()
        );
        for record in frame {
            let position = match record.position {
                Some([x, y, z]) => format!("({x:8.2}, {y:8.2}, {z:8.2})"),
                None => "(unplaced)".to_string(),
            };
            let line = format!(
                "    {:<12} {} alpha {:>3}",
                record.device_id, position, record.fade_alpha
            );
            if record.uncalibrated {
                println!("{}", line.red());
            } else if record.fade_alpha < 128 {
                println!("{}", line.dimmed());
            } else {
                println!("{line}");
            }
        }
    }
}

impl RenderSink for ConsoleSink {
    fn submit(&mut self, frame: &[DrawRecord]) {
        if self.frames % self.report_every == 0 {
            self.print_frame(frame);
        }
        self.frames += 1;
    }
}
