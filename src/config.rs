use crate::error::PlanError;
use crate::solver::SolverOptions;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Parser, Debug)]
#[command(
    name = "cmapd",
    about = "Multi-agent pickup and delivery planning on grid maps.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to the YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the map file")]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to the instance file")]
    pub instance_path: Option<String>,

    #[arg(long, value_enum, help = "Solver to use")]
    pub solver: Option<SolverKind>,

    #[arg(long, help = "Tasks an agent may carry at once")]
    pub capacity: Option<usize>,

    #[arg(long, help = "Expansions allowed per single-agent search")]
    pub low_level_budget: Option<usize>,

    #[arg(long, help = "Constraint tree nodes CBS may expand")]
    pub high_level_budget: Option<usize>,

    #[arg(long, help = "Path to the JSON solution file")]
    pub output_path: Option<String>,

    #[arg(long, help = "Log filter, overridden by RUST_LOG")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    Cbs,
    Pp,
    Pbs,
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverKind::Cbs => "cbs",
            SolverKind::Pp => "pp",
            SolverKind::Pbs => "pbs",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub map_path: String,
    pub instance_path: String,
    pub output_path: Option<String>,
    pub solver: SolverKind,
    pub capacity: usize,
    pub low_level_budget: Option<usize>,
    pub high_level_budget: Option<usize>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: "map_file/test/small.map".to_string(),
            instance_path: "map_file/test/small.instance".to_string(),
            output_path: None,
            solver: SolverKind::Cbs,
            capacity: 1,
            low_level_budget: None,
            high_level_budget: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Missing keys keep their default value.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Command line flags win over the config file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = map_path.clone();
        }
        if let Some(instance_path) = &cli.instance_path {
            self.instance_path = instance_path.clone();
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(solver) = cli.solver {
            self.solver = solver;
        }
        if let Some(capacity) = cli.capacity {
            self.capacity = capacity;
        }
        if cli.low_level_budget.is_some() {
            self.low_level_budget = cli.low_level_budget;
        }
        if cli.high_level_budget.is_some() {
            self.high_level_budget = cli.high_level_budget;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.clone();
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.capacity == 0 {
            return Err(PlanError::InvalidInput("capacity must be positive".to_string()).into());
        }
        if self.low_level_budget == Some(0) {
            return Err(
                PlanError::InvalidInput("low level budget must be positive".to_string()).into(),
            );
        }
        if self.high_level_budget == Some(0) {
            return Err(
                PlanError::InvalidInput("high level budget must be positive".to_string()).into(),
            );
        }
        Ok(())
    }

    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            low_level_budget: self.low_level_budget,
            high_level_budget: self.high_level_budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_keeps_defaults() {
        let config = Config::from_yaml_str("solver: pbs\ncapacity: 3\n").unwrap();
        assert_eq!(config.solver, SolverKind::Pbs);
        assert_eq!(config.capacity, 3);
        assert_eq!(config.map_path, Config::default().map_path);
        assert_eq!(config.high_level_budget, None);

        assert!(Config::from_yaml_str("solver: ecbs\n").is_err());
        assert!(Config::from_yaml_str("unknown_key: 1\n").is_err());
    }

    #[test]
    fn test_command_line_overrides() {
        let config = Config::from_yaml_str("solver: pp\nlow_level_budget: 100\n").unwrap();
        let cli = Cli::parse_from([
            "cmapd",
            "--solver",
            "cbs",
            "--high-level-budget",
            "50",
            "--map-path",
            "other.map",
        ]);
        let config = config.override_from_command_line(&cli).unwrap();

        assert_eq!(config.solver, SolverKind::Cbs);
        assert_eq!(config.map_path, "other.map");
        assert_eq!(
            config.solver_options(),
            SolverOptions {
                low_level_budget: Some(100),
                high_level_budget: Some(50),
            }
        );
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let cli = Cli::parse_from(["cmapd", "--capacity", "0"]);
        let err = Config::default().override_from_command_line(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlanError>(),
            Some(PlanError::InvalidInput(_))
        ));

        let config = Config {
            low_level_budget: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
