/*! The two-phase project pipeline.
 *
 * Phase one scans every file's imports into the foreign-module registry. Phase two translates each file
 * against the frozen registry, in path order. [`ProjectEmitter::plan`] runs both phases without touching
 * the disk; [`ProjectEmitter::write`] then materializes a plan.
 */

use crate::config::EmitterConfig;
use crate::extern_module::render_extern;
use crate::output;
use crate::report::{abandonment_diagnostics, AbandonedFile, EmitReport, WrittenFile};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use ts2hx_core::{Diagnostic, ForeignRegistry, HaxeFile, TranslationResult};
use ts2hx_parser::{Program, ProjectError};
use ts2hx_transform::{collect_foreign_modules, translate_unit, TranslateOptions};

/// The outcome for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// Root-relative source path.
    pub source: PathBuf,
    /// Where the file's module lands, relative to the output directory.
    pub output_path: PathBuf,
    pub result: TranslationResult,
}

#[derive(Debug, Clone)]
pub struct EmitPlan {
    pub files: Vec<PlannedFile>,
    pub externs: Vec<HaxeFile>,
    pub registry: ForeignRegistry,
}

impl EmitPlan {
    pub fn emitted(&self) -> impl Iterator<Item = &HaxeFile> {
        self.files.iter().filter_map(|file| file.result.file())
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        abandonment_diagnostics(
            self.files
                .iter()
                .filter_map(|file| file.result.abandonment().map(|reason| (&file.source, reason))),
        )
    }
}

pub struct ProjectEmitter {
    program: Program,
    config: EmitterConfig,
}

impl ProjectEmitter {
    pub fn new(program: Program, config: EmitterConfig) -> Self {
        Self { program, config }
    }

    /// Loads the project described by `tsconfig` under the configured base package.
    pub fn load(tsconfig: &Path, config: EmitterConfig) -> Result<Self, ProjectError> {
        let program = Program::load(tsconfig, &config.base_package)?;
        Ok(Self::new(program, config))
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn plan(&self) -> EmitPlan {
        let registry = collect_foreign_modules(&self.program).finish_around(
            &self.program.base_package,
            self.program.units().iter().map(|unit| &unit.address),
        );
        info!(modules = registry.len(), "collected foreign modules");

        let options = TranslateOptions::new(&self.config.indent_style);
        let files: Vec<PlannedFile> = self
            .program
            .translatable_units()
            .map(|(index, unit)| PlannedFile {
                source: unit.relative_path.clone(),
                output_path: unit.address.output_relative_path(),
                result: translate_unit(&self.program, &registry, index, &options),
            })
            .collect();

        let externs = registry
            .iter()
            .map(|(descriptor, address)| render_extern(descriptor, address, &options.indent_unit))
            .collect();

        let emitted = files.iter().filter(|f| f.result.is_emitted()).count();
        info!(
            emitted,
            abandoned = files.len() - emitted,
            "translated project files"
        );
        EmitPlan {
            files,
            externs,
            registry,
        }
    }

    /// Plans and writes the whole project.
    pub fn emit(&self) -> Result<EmitReport> {
        let plan = self.plan();
        self.write(&plan)
    }

    pub fn write(&self, plan: &EmitPlan) -> Result<EmitReport> {
        let out_dir = &self.config.out_dir;
        if self.config.clean {
            debug!(dir = %out_dir.display(), "cleaning output directory");
            output::clean_dir(out_dir)?;
        }

        let mut report = EmitReport::new(out_dir);
        for file in &plan.files {
            let target = out_dir.join(&file.output_path);
            match &file.result {
                TranslationResult::Emitted(haxe) => {
                    let changed = output::write_atomic(&target, &haxe.text)?;
                    report.written.push(WrittenFile {
                        source: Some(file.source.clone()),
                        output: file.output_path.clone(),
                        module: haxe.address.qualified_name(),
                        changed,
                    });
                }
                TranslationResult::Abandoned(reason) => {
                    let removed = output::remove_stale(&target)?.then(|| file.output_path.clone());
                    if removed.is_some() {
                        debug!(file = %target.display(), "removed stale output");
                    }
                    report.abandoned.push(AbandonedFile {
                        source: file.source.clone(),
                        reason: reason.clone(),
                        removed,
                    });
                }
            }
        }

        for haxe in &plan.externs {
            let changed = output::write_atomic(&out_dir.join(&haxe.output_path), &haxe.text)?;
            report.externs.push(WrittenFile {
                source: None,
                output: haxe.output_path.clone(),
                module: haxe.address.qualified_name(),
                changed,
            });
        }

        info!(
            written = report.written.len(),
            externs = report.externs.len(),
            abandoned = report.abandoned.len(),
            dir = %out_dir.display(),
            "wrote Haxe sources"
        );
        Ok(report)
    }
}
