use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};

use super::elevator_config::{ElevatorConfiguration, ElevatorType};

const CONFIG_FILE_PATH: &str = "config.json";
const FALLBACK_CONFIG_FILE_PATH: &str = "_config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    Fifo,
    Closest,
    Scan,
    Look,
}

impl SchedulerKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fifo" => Some(SchedulerKind::Fifo),
            "closest" => Some(SchedulerKind::Closest),
            "scan" => Some(SchedulerKind::Scan),
            "look" => Some(SchedulerKind::Look),
            _ => None,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorTiming {
    pub floor_travel_ms: u64,
    pub door_operation_ms: u64,
}

impl ElevatorTiming {
    pub const fn new(floor_travel_ms: u64, door_operation_ms: u64) -> Self {
        ElevatorTiming { floor_travel_ms, door_operation_ms }
    }
}

/// Settings read once before the fleet starts. Never reloaded at runtime.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SystemSettings {
    pub min_floor: i32,
    pub max_floor: i32,
    pub local_elevator_count: usize,
    pub express_elevator_count: usize,
    pub freight_elevator_count: usize,
    pub global_timeout_ms: u64,
    pub retry_backoff_ms: u64,
    pub express_allowed_floors: Vec<i32>,
    pub freight_allowed_floors: Vec<i32>,
    pub scheduler: SchedulerKind,
    pub local_timing: ElevatorTiming,
    pub express_timing: ElevatorTiming,
    pub freight_timing: ElevatorTiming,
}

impl Default for SystemSettings {
    fn default() -> Self {
        SystemSettings {
            min_floor: 1,
            max_floor: 10,
            local_elevator_count: 2,
            express_elevator_count: 1,
            freight_elevator_count: 1,
            global_timeout_ms: 10_000,
            retry_backoff_ms: 100,
            express_allowed_floors: Vec::new(),
            freight_allowed_floors: Vec::new(),
            scheduler: SchedulerKind::Closest,
            local_timing: ElevatorTiming::new(1000, 2000),
            express_timing: ElevatorTiming::new(500, 2000),
            freight_timing: ElevatorTiming::new(2000, 4000),
        }
    }
}

impl SystemSettings {
    /// Reads the settings file (or falls back to defaults), then applies
    /// command line overrides given as `--key value` pairs.
    pub fn load(args: &[String]) -> Result<Self, ConfigError> {
        let config_path = args
            .windows(2)
            .find(|pair| pair[0] == "--config")
            .map(|pair| PathBuf::from(&pair[1]));

        let mut settings = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => read_config_file()?,
        };
        settings.apply_args(args);
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn apply_args(&mut self, args: &[String]) {
        for arg_pair in args.rchunks_exact(2) {
            let value = arg_pair[1].as_str();
            match arg_pair[0].as_str() {
                "--config" => {},
                "--scheduler" => match SchedulerKind::parse(value) {
                    Some(kind) => self.scheduler = kind,
                    None => warn!("unknown scheduler {}, skipping...", value),
                },
                "--min-floor" => match value.parse::<i32>() {
                    Ok(floor) => self.min_floor = floor,
                    Err(_) => warn!("min floor {} is not a number, skipping...", value),
                },
                "--max-floor" => match value.parse::<i32>() {
                    Ok(floor) => self.max_floor = floor,
                    Err(_) => warn!("max floor {} is not a number, skipping...", value),
                },
                "--timeout-ms" => match value.parse::<u64>() {
                    Ok(ms) => self.global_timeout_ms = ms,
                    Err(_) => warn!("timeout {} is not a number, skipping...", value),
                },
                other => warn!("illegal argument {}, skipping...", other),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_floor > self.max_floor {
            return Err(ConfigError::Invalid(format!(
                "min_floor {} is above max_floor {}",
                self.min_floor, self.max_floor
            )));
        }
        let bounds = self.min_floor..=self.max_floor;
        for floor in self.express_allowed_floors.iter().chain(&self.freight_allowed_floors) {
            if !bounds.contains(floor) {
                return Err(ConfigError::Invalid(format!(
                    "allowed floor {} lies outside {}..={}",
                    floor, self.min_floor, self.max_floor
                )));
            }
        }
        if self.elevator_count() == 0 {
            return Err(ConfigError::Invalid(String::from("the fleet has no elevators")));
        }
        Ok(())
    }

    pub fn elevator_count(&self) -> usize {
        self.local_elevator_count + self.express_elevator_count + self.freight_elevator_count
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.global_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn is_within_bounds(&self, floor: i32) -> bool {
        (self.min_floor..=self.max_floor).contains(&floor)
    }

    /// The fleet in start order: locals, then expresses, then freights.
    pub fn elevator_configurations(&self) -> Vec<ElevatorConfiguration> {
        let mut configurations = Vec::with_capacity(self.elevator_count());
        let groups: [(ElevatorType, usize, ElevatorTiming, &[i32]); 3] = [
            (ElevatorType::Local, self.local_elevator_count, self.local_timing, &[]),
            (ElevatorType::Express, self.express_elevator_count, self.express_timing, &self.express_allowed_floors),
            (ElevatorType::Freight, self.freight_elevator_count, self.freight_timing, &self.freight_allowed_floors),
        ];
        for (elevator_type, count, timing, allowed_floors) in groups {
            for _ in 0..count {
                configurations.push(
                    ElevatorConfiguration::new(elevator_type)
                        .with_allowed_floors(allowed_floors.iter().copied())
                        .with_timing(
                            Duration::from_millis(timing.floor_travel_ms),
                            Duration::from_millis(timing.door_operation_ms),
                        ),
                );
            }
        }
        configurations
    }
}

fn read_config_file() -> Result<SystemSettings, ConfigError> {
    for file_path in [CONFIG_FILE_PATH, FALLBACK_CONFIG_FILE_PATH] {
        let path = Path::new(file_path);
        if path.exists() {
            info!("reading configuration from {}", file_path);
            return SystemSettings::from_file(path);
        }
    }
    info!("No configuration file provided, using default settings...");
    Ok(SystemSettings::default())
}
