use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct BenchCli {
    /// Path to the task file, YAML or JSON, describing users, tenants and contexts
    #[clap(short, long)]
    pub task: PathBuf,

    /// Write the tenants, with everything the contexts attached to them, to this file as JSON
    /// once setup has finished
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// How to report on the operations performed during the run
    #[clap(long, value_enum, default_value_t = ReporterOpt::InMemory)]
    pub reporter: ReporterOpt,
}

#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReporterOpt {
    /// Keep operations in memory and print a summary at the end of the run
    #[default]
    InMemory,
    /// Discard operation records
    Noop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_args() {
        let cli = BenchCli::try_parse_from(["openstack-bench", "--task", "task.yaml"]).unwrap();

        assert_eq!(PathBuf::from("task.yaml"), cli.task);
        assert_eq!(None, cli.output);
        assert_eq!(ReporterOpt::InMemory, cli.reporter);
    }

    #[test]
    fn parse_all_args() {
        let cli = BenchCli::try_parse_from([
            "openstack-bench",
            "-t",
            "task.json",
            "-o",
            "out.json",
            "--reporter",
            "noop",
        ])
        .unwrap();

        assert_eq!(Some(PathBuf::from("out.json")), cli.output);
        assert_eq!(ReporterOpt::Noop, cli.reporter);
    }

    #[test]
    fn task_is_required() {
        assert!(BenchCli::try_parse_from(["openstack-bench"]).is_err());
    }
}
