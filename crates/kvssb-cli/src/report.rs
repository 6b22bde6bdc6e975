use anyhow::{Context, Result};
use colored::Colorize;
use kvssb_core::scenario::{Frame, ReplayReport, Summary};
use kvssb_core::sync::SyncEffect;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Final text and step count of one counter
struct CounterRun {
    steps: usize,
    text: String,
    at_ms: u64,
}

/// JSON lines: every frame, then `{"summary": ...}`.
pub fn print_json(report: &ReplayReport) -> Result<()> {
    let mut out = io::stdout().lock();
    for frame in &report.frames {
        let line = serde_json::to_string(frame).context("Failed to serialize frame")?;
        writeln!(out, "{line}")?;
    }
    let summary = serde_json::json!({ "summary": report.summary });
    writeln!(out, "{summary}")?;
    Ok(())
}

/// Counter steps are folded into one line per counter; timer scheduling
/// is left out.
pub fn print_human(report: &ReplayReport) {
    let mut counters: BTreeMap<usize, CounterRun> = BTreeMap::new();

    println!("{}", "Effects:".cyan().bold());
    for frame in &report.frames {
        match &frame.effect {
            SyncEffect::SetCounterText { counter, text } => {
                let run = counters.entry(counter.0).or_insert(CounterRun {
                    steps: 0,
                    text: String::new(),
                    at_ms: 0,
                });
                run.steps += 1;
                run.text.clone_from(text);
                run.at_ms = frame.at_ms;
            }
            SyncEffect::ScheduleCounterTick { .. } => {}
            _ => println!("{}", describe(frame)),
        }
    }

    for (index, run) in &counters {
        println!(
            "{} counter #{} reached {} after {} steps",
            stamp(run.at_ms),
            index + 1,
            run.text.bold(),
            run.steps
        );
    }

    println!();
    print_summary(&report.summary);
}

fn stamp(at_ms: u64) -> String {
    format!("{:>7}", format!("{at_ms}ms")).dimmed().to_string()
}

fn describe(frame: &Frame) -> String {
    let what = match &frame.effect {
        SyncEffect::SetLinkActive { href, active, .. } => {
            let state = if *active {
                "active".green()
            } else {
                "inactive".dimmed()
            };
            format!("link {href} {state}")
        }
        SyncEffect::SetBackToTop { visible } => {
            format!("back-to-top {}", if *visible { "shown" } else { "hidden" })
        }
        SyncEffect::Reveal { target, .. } => format!("reveal target #{}", target.0 + 1),
        SyncEffect::StopObservingCounters => "counters started, host unobserved".to_string(),
        SyncEffect::SetCounterText { counter, text } => {
            format!("counter #{} = {text}", counter.0 + 1)
        }
        SyncEffect::ScheduleCounterTick { counter, delay_ms } => {
            format!("counter #{} tick in {delay_ms}ms", counter.0 + 1)
        }
    };
    format!("{} {what}", stamp(frame.at_ms))
}

fn print_summary(summary: &Summary) {
    println!("{}", format!("Summary at {}ms:", summary.at_ms).cyan().bold());
    println!("  scroll offset:  {}", summary.offset);
    match &summary.active {
        Some(id) => println!("  active section: {}", id.green()),
        None => println!("  active section: {}", "none".dimmed()),
    }
    println!(
        "  back-to-top:    {}",
        if summary.back_to_top { "visible" } else { "hidden" }
    );
    if summary.counters.is_empty() {
        println!("  counters:       {}", "none".dimmed());
    } else {
        println!("  counters:       {}", summary.counters.join(", "));
    }
    println!(
        "  reveals:        {} played, {} pending",
        summary.revealed, summary.pending_reveals
    );
    println!("  counter ticks:  {}", summary.ticks);
}
