/*! Turn a whole TypeScript project into a Haxe source tree.
 *
 * Translation itself happens one file at a time, but the outputs only make sense together: every
 * foreign module referenced anywhere needs exactly one extern class, and a file that was abandoned this
 * run must not leave last run's output behind. The [`ProjectEmitter`] runs the two phases in order and
 * writes each file whole, so an interrupted run never leaves a half-written module.
 */

pub mod config;
pub mod extern_module;
pub mod output;
pub mod pipeline;
pub mod report;

pub use config::EmitterConfig;
pub use extern_module::render_extern;
pub use output::{OutputFormat, OutputFormatter};
pub use pipeline::{EmitPlan, PlannedFile, ProjectEmitter};
pub use report::{AbandonedFile, EmitReport, WrittenFile};
