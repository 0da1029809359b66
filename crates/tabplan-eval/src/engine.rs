//! The execution engine: runs a plan's steps strictly in order.

use crate::catalog::{self, Context, Outcome, Step};
use crate::env::Environment;
use crate::options::EngineOptions;
use crate::reducer::{self, PlanOutput};
use crate::resolver;
use crate::source::TableSource;
use tabplan_types::{Operation, Plan, PlanError, RunError, StepError, Value};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Failed,
    Completed,
}

/// Runs plans against a table source.
///
/// Each [`run`](Engine::run) starts from an empty environment. After a run,
/// the environment and transcript stay available for inspection, whether the
/// run succeeded or failed.
pub struct Engine<'s> {
    /// Where `load-table` steps read from.
    source: &'s dyn TableSource,
    options: EngineOptions,
    /// Bindings produced by the current run.
    env: Environment,
    state: EngineState,
    /// Result of the last step without an output name.
    last_unlabeled: Option<Value>,
    /// Human-readable lines: step banners, stores, display renderings, errors.
    transcript: Vec<String>,
}

impl<'s> Engine<'s> {
    pub fn new(source: &'s dyn TableSource) -> Self {
        Self::with_options(source, EngineOptions::default())
    }

    pub fn with_options(source: &'s dyn TableSource, options: EngineOptions) -> Self {
        Self {
            source,
            options,
            env: Environment::new(),
            state: EngineState::Running,
            last_unlabeled: None,
            transcript: Vec::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Execute every step of `plan` in order and reduce the bindings to one
    /// output.
    ///
    /// The first failing step stops the run: nothing it computed is bound
    /// and no later step runs.
    pub fn run(&mut self, plan: &Plan) -> Result<PlanOutput, RunError> {
        self.env = Environment::new();
        self.state = EngineState::Running;
        self.last_unlabeled = None;
        self.transcript.clear();

        if plan.is_empty() {
            self.state = EngineState::Failed;
            self.transcript.push(format!("ERROR: {}", PlanError::EmptyPlan));
            return Err(PlanError::EmptyPlan.into());
        }

        tracing::info!(steps = plan.len(), "executing plan");
        for (index, op) in plan.iter().enumerate() {
            if let Err(error) = self.step(index, op) {
                self.state = EngineState::Failed;
                let err = StepError {
                    index,
                    kind: op.kind,
                    description: op.description.clone(),
                    error,
                };
                tracing::error!(step = index + 1, kind = %op.kind, error = %err.error, "step failed");
                self.transcript.push(format!("ERROR: {err}"));
                return Err(err.into());
            }
        }

        self.state = EngineState::Completed;
        let output = reducer::reduce(self.last_unlabeled.as_ref(), &self.env);
        tracing::info!(bindings = self.env.len(), "plan completed");
        Ok(output)
    }

    fn step(&mut self, index: usize, op: &Operation) -> Result<(), PlanError> {
        let label = op.label(index);
        self.transcript.push(format!("STEP {}: {label}", index + 1));
        tracing::debug!(
            step = index + 1,
            kind = %op.kind,
            input = ?op.input,
            output = ?op.output,
            "{label}"
        );

        let step = Step::decode(op)?;
        let inputs = resolver::resolve(op, &step, &self.env)?;
        let ctx = Context {
            source: self.source,
            options: &self.options,
        };

        match catalog::apply(&step, &inputs, &ctx)? {
            Outcome::Rendered(text) => {
                tracing::info!("\n{text}");
                self.transcript.push(text);
            }
            Outcome::Value(value) => self.record(op, value),
        }
        Ok(())
    }

    /// Bind or remember a step result.
    fn record(&mut self, op: &Operation, value: Value) {
        let shape = value.describe();
        match (&op.output, &op.input) {
            (Some(out), _) => {
                tracing::debug!(name = %out, result = %shape, "stored result");
                self.transcript
                    .push(format!("Stored {} as '{out}'. {shape}", value.kind()));
                self.env.bind(out, value);
            }
            (None, _) if value.is_null() => {
                self.transcript.push("Result: null".to_string());
            }
            (None, input) => {
                if let (Value::Table(_), Some(input)) = (&value, input) {
                    self.env.bind(input, value.clone());
                    self.transcript
                        .push(format!("Updated table '{input}'. {shape}"));
                } else {
                    self.transcript.push(format!("Result: {}", value.to_json()));
                }
                self.last_unlabeled = Some(value);
            }
        }
    }
}
