use std::io::{Result, Write};

use crossterm::{terminal, ExecutableCommand};

use shared_resources::elevator_snapshot::ElevatorSnapshot;

use super::metrics::MetricsSnapshot;

const ROW_SEPARATOR: &str = "+----------+------------+------------+--------------+------------+--------------+";

pub fn print_status<W: Write>(out: &mut W, snapshots: &[ElevatorSnapshot]) -> Result<()> {
    out.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;

    writeln!(out, "{}", ROW_SEPARATOR)?;
    writeln!(out, "| {0:<76} |", "ELEVATORS")?;
    writeln!(out, "{}", ROW_SEPARATOR)?;
    writeln!(
        out,
        "| {0:<8} | {1:<10} | {2:<10} | {3:<12} | {4:<10} | {5:<12} |",
        "NUMBER", "TYPE", "FLOOR", "STATE", "QUEUE", "ALLOWED"
    )?;
    for snapshot in snapshots {
        writeln!(out, "{}", ROW_SEPARATOR)?;
        writeln!(
            out,
            "| {0:<8} | {1:<10} | {2:<10} | {3:<12} | {4:<10} | {5:<12} |",
            snapshot.index + 1,
            snapshot.elevator_type.to_string(),
            snapshot.floor,
            snapshot.state.as_string(),
            snapshot.pending,
            snapshot.allowed_floors_as_string(),
        )?;
    }
    writeln!(out, "{}\n", ROW_SEPARATOR)?;
    Ok(())
}

pub fn print_metrics<W: Write>(out: &mut W, snapshot: &MetricsSnapshot) -> Result<()> {
    writeln!(out, "+-------------------------------------+")?;
    writeln!(out, "| SYSTEM METRICS                      |")?;
    writeln!(out, "+------------------------+------------+")?;
    writeln!(out, "| {0:<22} | {1:>10} |", "REQUESTS COMPLETED", snapshot.requests_completed)?;
    writeln!(out, "| {0:<22} | {1:>10} |", "REQUESTS DROPPED", snapshot.requests_dead_lettered)?;
    writeln!(out, "| {0:<22} | {1:>8.1}s |", "AVG WAIT", snapshot.average_wait_ms / 1000.0)?;
    writeln!(out, "| {0:<22} | {1:>8.1}s |", "LONGEST WAIT", snapshot.longest_wait_ms / 1000.0)?;
    writeln!(out, "| {0:<22} | {1:>10} |", "STATE CHANGES", snapshot.state_transitions)?;
    writeln!(out, "+------------------------+------------+\n")?;
    Ok(())
}
