/// ----- CONSOLE MODULE -----
/// Operator console. Lines typed on stdin are parsed into commands and run
/// against the fleet: submit rides, stop or suspend single cars, and print
/// the fleet status or the collected metrics.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{select, unbounded, Receiver};
use log::info;

use shared_resources::request::Request;

use crate::modules::elevator::Elevator;
use crate::modules::fleet::Fleet;
use crate::utilities::debug;
use crate::utilities::metrics::InMemoryMetricsCollector;

const HELP: &str = "\
Commands:
 req [pickup] [dest]       - request an elevator (e.g. req 1 5)
 req [pickup] [dest] vip   - request a VIP ride (e.g. req 1 5 vip)
 emergency [1..N]          - emergency stop one elevator, dropping its queue
 maintenance [1..N]        - take one elevator out for maintenance
 resume [1..N]             - bring a stopped elevator back into service
 status                    - view elevator status
 metrics                   - view system metrics
 q                         - quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Request { pickup: i32, destination: i32, vip: bool },
    Emergency(usize),
    Maintenance(usize),
    Resume(usize),
    Status,
    Metrics,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command {0}, type help for a list")]
    Unknown(String),
    #[error("invalid args, usage: {0}")]
    Usage(&'static str),
    #[error("{0} is not a number")]
    NotANumber(String),
}

pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let lowered = line.to_lowercase();
    let parts: Vec<&str> = lowered.split_whitespace().collect();
    let Some((&name, args)) = parts.split_first() else {
        return Ok(None);
    };

    let command = match name {
        "req" => {
            if args.len() < 2 {
                return Err(CommandError::Usage("req [pickup] [dest] [optional: vip]"));
            }
            Command::Request {
                pickup: parse_number(args[0])?,
                destination: parse_number(args[1])?,
                vip: args.get(2) == Some(&"vip"),
            }
        },
        "emergency" => Command::Emergency(parse_elevator_number(args, "emergency [1..N]")?),
        "maintenance" => Command::Maintenance(parse_elevator_number(args, "maintenance [1..N]")?),
        "resume" => Command::Resume(parse_elevator_number(args, "resume [1..N]")?),
        "status" => Command::Status,
        "metrics" => Command::Metrics,
        "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_number<T: std::str::FromStr>(arg: &str) -> Result<T, CommandError> {
    arg.parse::<T>().map_err(|_| CommandError::NotANumber(arg.to_string()))
}

fn parse_elevator_number(args: &[&str], usage: &'static str) -> Result<usize, CommandError> {
    match args.first() {
        Some(arg) => parse_number(arg),
        None => Err(CommandError::Usage(usage)),
    }
}

/// Spawns the thread feeding stdin lines to the console loop.
pub fn spawn_stdin_reader() -> io::Result<Receiver<String>> {
    let (line_tx, line_rx) = unbounded();
    thread::Builder::new().name("console".to_string()).spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    })?;
    Ok(line_rx)
}

/// Runs until the operator quits or stdin is closed.
pub fn main(fleet: &Fleet, metrics: &InMemoryMetricsCollector, line_rx: Receiver<String>) -> io::Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "=========================================")?;
    writeln!(stdout, "            Elevator Fleet               ")?;
    writeln!(stdout, "=========================================")?;
    writeln!(stdout, "{}", HELP)?;
    writeln!(stdout, "=========================================\n")?;

    loop {
        select! {
            recv(line_rx) -> msg => {
                let Ok(line) = msg else {
                    info!("stdin closed, shutting down...");
                    return Ok(());
                };
                match parse_command(&line) {
                    Ok(Some(Command::Quit)) => {
                        writeln!(stdout, "Shutting down...")?;
                        return Ok(());
                    },
                    Ok(Some(command)) => execute(fleet, metrics, command, &mut stdout)?,
                    Ok(None) => {},
                    Err(err) => writeln!(stdout, "{}", err)?,
                }
                stdout.flush()?;
            }
        }
    }
}

pub fn execute<W: Write>(fleet: &Fleet, metrics: &InMemoryMetricsCollector, command: Command, out: &mut W) -> io::Result<()> {
    match command {
        Command::Request { pickup, destination, vip } => {
            match fleet.submit_request(Request::new(pickup, destination).vip(vip)) {
                Ok(()) => writeln!(out, "Request submitted to dispatcher.")?,
                Err(err) => writeln!(out, "Error processing command: {}", err)?,
            }
        },
        Command::Emergency(number) => {
            if let Some(elevator) = elevator_by_number(fleet, number, out)? {
                let dropped = elevator.emergency_stop();
                writeln!(out, "[!] EMERGENCY STOP triggered for elevator {}. {} queued requests dropped.", number, dropped)?;
            }
        },
        Command::Maintenance(number) => {
            if let Some(elevator) = elevator_by_number(fleet, number, out)? {
                elevator.enter_maintenance();
                writeln!(out, "Elevator {} is in maintenance.", number)?;
            }
        },
        Command::Resume(number) => {
            if let Some(elevator) = elevator_by_number(fleet, number, out)? {
                match elevator.exit_maintenance() {
                    Ok(()) => writeln!(out, "Elevator {} is back in service.", number)?,
                    Err(err) => writeln!(out, "Error processing command: {}", err)?,
                }
            }
        },
        Command::Status => debug::print_status(out, &fleet.snapshots())?,
        Command::Metrics => debug::print_metrics(out, &metrics.snapshot())?,
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Quit => {},
    }
    Ok(())
}

fn elevator_by_number<'a, W: Write>(
    fleet: &'a Fleet,
    number: usize,
    out: &mut W,
) -> io::Result<Option<&'a Arc<Elevator>>> {
    let elevators = fleet.elevators();
    if number == 0 || number > elevators.len() {
        writeln!(out, "Elevator number out of range, valid: 1-{}.", elevators.len())?;
        return Ok(None);
    }
    Ok(Some(&elevators[number - 1]))
}

#[cfg(test)]
mod tests {
    use shared_resources::config::SystemSettings;
    use shared_resources::elevator_state::ElevatorState;

    use super::*;
    use crate::utilities::clock::InstantClock;

    #[test]
    fn blank_line_is_not_a_command() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn ride_requests_are_parsed_with_optional_vip() {
        assert_eq!(
            parse_command("req 1 5"),
            Ok(Some(Command::Request { pickup: 1, destination: 5, vip: false }))
        );
        assert_eq!(
            parse_command("REQ 7 -1 VIP"),
            Ok(Some(Command::Request { pickup: 7, destination: -1, vip: true }))
        );
        assert_eq!(parse_command("req 3"), Err(CommandError::Usage("req [pickup] [dest] [optional: vip]")));
        assert_eq!(parse_command("req one 3"), Err(CommandError::NotANumber("one".to_string())));
    }

    #[test]
    fn elevator_commands_need_a_number() {
        assert_eq!(parse_command("emergency 2"), Ok(Some(Command::Emergency(2))));
        assert_eq!(parse_command("maintenance 1"), Ok(Some(Command::Maintenance(1))));
        assert_eq!(parse_command("resume 3"), Ok(Some(Command::Resume(3))));
        assert_eq!(parse_command("resume"), Err(CommandError::Usage("resume [1..N]")));
        assert_eq!(parse_command("emergency x"), Err(CommandError::NotANumber("x".to_string())));
    }

    #[test]
    fn simple_commands_and_unknown_words() {
        assert_eq!(parse_command("status"), Ok(Some(Command::Status)));
        assert_eq!(parse_command("metrics"), Ok(Some(Command::Metrics)));
        assert_eq!(parse_command("exit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("fly 3"), Err(CommandError::Unknown("fly".to_string())));
    }

    #[test]
    fn commands_reach_the_fleet() {
        let metrics = Arc::new(InMemoryMetricsCollector::new());
        let fleet = Fleet::from_settings(SystemSettings::default(), Arc::new(InstantClock), metrics.clone()).unwrap();
        let mut out = Vec::new();

        execute(&fleet, &metrics, Command::Maintenance(2), &mut out).unwrap();
        assert_eq!(fleet.elevators()[1].state(), ElevatorState::Maintenance);

        execute(&fleet, &metrics, Command::Resume(2), &mut out).unwrap();
        assert_eq!(fleet.elevators()[1].state(), ElevatorState::Idle);

        execute(&fleet, &metrics, Command::Emergency(9), &mut out).unwrap();
        execute(&fleet, &metrics, Command::Request { pickup: 0, destination: 4, vip: false }, &mut out).unwrap();

        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Elevator 2 is in maintenance."));
        assert!(text.contains("Elevator 2 is back in service."));
        assert!(text.contains("Elevator number out of range, valid: 1-4."));
        assert!(text.contains("pickup floor 0 is invalid, valid range: 1-10"));
    }
}
