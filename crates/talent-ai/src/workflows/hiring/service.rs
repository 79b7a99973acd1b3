use std::sync::Arc;

use tracing::info;

use super::collaborators::HiringCollaborators;
use super::domain::Employee;
use super::engine::{PipelineSettings, WorkflowEngine};
use super::error::PipelineError;
use super::intake::{IntakeReport, IntakeSettings, ResumeIntake};
use super::report::PipelineRunSummary;
use super::requirements::{RequirementsArtifact, RequirementsSource};
use super::roster::{EmployeeRoster, RosterError};
use super::state::PipelineState;

/// Service exposing the two invocable hiring operations over one set of collaborators.
pub struct HiringService {
    engine: WorkflowEngine,
    intake: Arc<ResumeIntake>,
    requirements: RequirementsArtifact,
}

impl HiringService {
    /// Wire the pipeline engine and the intake graph against a shared requirements artifact.
    pub fn new(
        pipeline: PipelineSettings,
        intake: IntakeSettings,
        collaborators: HiringCollaborators,
        requirements: RequirementsArtifact,
    ) -> Result<Self, HiringServiceError> {
        let engine = WorkflowEngine::new(pipeline, collaborators.clone(), requirements.clone())?;
        let intake = ResumeIntake::new(intake, collaborators, requirements.clone());
        Ok(Self::from_parts(engine, intake, requirements))
    }

    pub fn from_parts(
        engine: WorkflowEngine,
        intake: ResumeIntake,
        requirements: RequirementsArtifact,
    ) -> Self {
        Self {
            engine,
            intake: Arc::new(intake),
            requirements,
        }
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    /// Shared handle for the periodic scheduler.
    pub fn intake(&self) -> Arc<ResumeIntake> {
        Arc::clone(&self.intake)
    }

    /// Run the full pipeline for a departing employee and return the final state.
    pub async fn run_pipeline_state(
        &self,
        employee: Employee,
    ) -> Result<PipelineState, HiringServiceError> {
        validate_employee(&employee)?;
        Ok(self.engine.run(employee).await)
    }

    pub async fn run_pipeline(
        &self,
        employee: Employee,
    ) -> Result<PipelineRunSummary, HiringServiceError> {
        let state = self.run_pipeline_state(employee).await?;
        Ok(PipelineRunSummary::from_state(&state))
    }

    /// Pick the employee from a roster, by id or else the first departure, and run for them.
    pub async fn run_pipeline_for(
        &self,
        roster: &EmployeeRoster,
        employee_id: Option<&str>,
    ) -> Result<PipelineRunSummary, HiringServiceError> {
        let employee = match employee_id {
            Some(id) => roster.find(id)?,
            None => roster.departing()?,
        };
        info!(employee = %employee.id, position = %employee.position, "starting pipeline from roster");
        self.run_pipeline(employee.clone()).await
    }

    pub async fn run_intake_once(&self) -> IntakeReport {
        self.intake.run_once().await
    }

    /// Requirements the next intake tick will score against.
    pub fn current_requirements(&self) -> (Vec<String>, RequirementsSource) {
        self.requirements.load_or_default()
    }
}

fn validate_employee(employee: &Employee) -> Result<(), HiringServiceError> {
    if employee.id.trim().is_empty() {
        return Err(HiringServiceError::InvalidEmployee("employee id is required"));
    }
    if employee.position.trim().is_empty() {
        return Err(HiringServiceError::InvalidEmployee("employee position is required"));
    }
    if !employee.salary.is_finite() || employee.salary < 0.0 {
        return Err(HiringServiceError::InvalidEmployee(
            "employee salary must be a non-negative number",
        ));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HiringServiceError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("invalid employee: {0}")]
    InvalidEmployee(&'static str),
}
