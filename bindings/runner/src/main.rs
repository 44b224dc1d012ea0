use anyhow::Context;
use cloudbench_instruments::ReportConfig;
use openstack_bench_runner::prelude::*;

fn main() -> BenchResult<()> {
    let cli = init();

    let registry = default_registry()?;
    let task = TaskConfig::from_file(&cli.task)?;

    let reporter = match cli.reporter {
        ReporterOpt::InMemory => ReportConfig::default().enable_in_memory().init(),
        ReporterOpt::Noop => Reporter::noop(),
    };

    let tenants = run(&registry, &task, reporter, None)?;

    if let Some(output) = &cli.output {
        let content =
            serde_json::to_string_pretty(&tenants).context("Failed to serialize tenants")?;
        std::fs::write(output, content)
            .with_context(|| format!("Failed to write output file: {}", output.display()))?;
        log::info!("Wrote tenants to {}", output.display());
    }

    Ok(())
}
