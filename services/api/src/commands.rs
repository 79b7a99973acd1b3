use crate::infra::{load_applicants, offline_collaborators};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use talent_ai::config::{intake_interval, AppConfig, MAX_INTAKE_INTERVAL_MINUTES};
use talent_ai::error::AppError;
use talent_ai::telemetry;
use talent_ai::workflows::hiring::{
    render_ats_summary, render_pipeline_summary, EmployeeRoster, HiringService, IntakeScheduler,
    PostPublishPolicy,
};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct PipelineArgs {
    /// Employee roster CSV (id,name,position,department,salary,last_working_day,...)
    #[arg(long)]
    pub(crate) employees: PathBuf,
    /// Run for this employee instead of the first one with a last working day
    #[arg(long)]
    pub(crate) employee_id: Option<String>,
    /// JSON applicant list for the offline job board (defaults to a built-in sample pool)
    #[arg(long)]
    pub(crate) applicants: Option<PathBuf>,
    /// Keep going after the posting is published instead of stopping there
    #[arg(long)]
    pub(crate) continue_after_publish: bool,
    /// Print the run summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct IntakeArgs {
    /// Run a single tick and print the ATS summary
    #[arg(long)]
    pub(crate) once: bool,
    /// Override the configured tick interval
    #[arg(long)]
    pub(crate) interval_minutes: Option<u64>,
    /// Override the configured inbox folder
    #[arg(long)]
    pub(crate) inbox: Option<PathBuf>,
}

pub(crate) async fn run_pipeline(args: PipelineArgs) -> Result<(), AppError> {
    let PipelineArgs {
        employees,
        employee_id,
        applicants,
        continue_after_publish,
        json,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let roster = EmployeeRoster::from_path(&employees)?;
    let applicants = load_applicants(applicants.as_deref())?;

    let mut settings = config.pipeline_settings();
    if continue_after_publish {
        settings.post_publish = PostPublishPolicy::Continue;
    }

    let service = HiringService::new(
        settings,
        config.intake_settings(),
        offline_collaborators(applicants, &config.intake.inbox_dir),
        config.requirements_artifact(),
    )?;

    let summary = service
        .run_pipeline_for(&roster, employee_id.as_deref())
        .await?;

    if json {
        let rendered = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        println!("{}", render_pipeline_summary(&summary));
    }
    Ok(())
}

pub(crate) async fn run_intake(args: IntakeArgs) -> Result<(), AppError> {
    let IntakeArgs {
        once,
        interval_minutes,
        inbox,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let interval = match interval_minutes {
        Some(minutes) => interval_override(minutes)?,
        None => config.intake.interval,
    };
    let inbox = inbox.unwrap_or_else(|| config.intake.inbox_dir.clone());

    let service = HiringService::new(
        config.pipeline_settings(),
        config.intake_settings(),
        offline_collaborators(Vec::new(), &inbox),
        config.requirements_artifact(),
    )?;

    if once {
        let report = service.run_intake_once().await;
        println!("{}", render_ats_summary(&report));
        return Ok(());
    }

    let handle = IntakeScheduler::spawn(service.intake(), interval);
    info!(inbox = %inbox.display(), "resume intake running; press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
    let ticks = handle.shutdown().await;
    println!("Intake stopped after {ticks} tick(s)");
    Ok(())
}

fn interval_override(minutes: u64) -> Result<Duration, AppError> {
    intake_interval(minutes).ok_or_else(|| {
        AppError::Input(format!(
            "interval-minutes must be between 1 and {MAX_INTAKE_INTERVAL_MINUTES}, got {minutes}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_override_converts_minutes() {
        let interval = interval_override(15).expect("valid interval");
        assert_eq!(interval, Duration::from_secs(900));
    }

    #[test]
    fn interval_override_rejects_zero_and_overflow() {
        assert!(matches!(interval_override(0), Err(AppError::Input(_))));
        assert!(matches!(interval_override(u64::MAX), Err(AppError::Input(_))));
    }
}
