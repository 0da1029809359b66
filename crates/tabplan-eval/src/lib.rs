//! tabplan execution engine.
//!
//! Runs a [`Plan`](tabplan_types::Plan) of tabular operations against a
//! [`TableSource`], binding each step's result by name and reducing the
//! final environment to a single [`PlanOutput`].
//!
//! ```no_run
//! use tabplan_eval::{CsvSource, Engine};
//! use tabplan_types::Plan;
//!
//! let plan = Plan::from_json(r#"{"operations": []}"#)?;
//! let source = CsvSource::with_base_dir("data");
//! let output = Engine::new(&source).run(&plan)?;
//! println!("{}", output.to_json());
//! # Ok::<(), tabplan_types::RunError>(())
//! ```

pub mod catalog;
pub mod engine;
pub mod env;
pub mod options;
pub mod reducer;
pub mod resolver;
pub mod source;

pub use catalog::Step;
pub use engine::{Engine, EngineState};
pub use env::Environment;
pub use options::EngineOptions;
pub use reducer::{PlanOutput, NO_OUTPUT_MESSAGE};
pub use resolver::Inputs;
pub use source::{CsvSource, MemorySource, TableSource};
