//! Structural verification of functions.
//!
//! A function is well formed if it has an entry block and every one of its
//! blocks can be reached from that entry by following successor edges. The
//! uniqueness of successor tags is enforced when edges are added and is not
//! re-checked here.
mod config;
mod diagnostic;
mod report;

pub use config::VerifierConfig;
pub use diagnostic::{Diagnostic, DiagnosticCode, Location, Severity};
pub use report::VerificationReport;

use rustc_hash::FxHashSet;

use crate::{ControlFlowGraph, FuncRef, Module};

pub fn verify_function(
    module: &Module,
    func_ref: FuncRef,
    config: &VerifierConfig,
) -> VerificationReport {
    let func = module.func(func_ref);
    let mut report = VerificationReport::default();

    if func.entry_block().is_none() {
        report.push(
            Diagnostic::error(
                DiagnosticCode::MissingEntryBlock,
                Location::Function(func_ref),
                format!("function `{}` has no entry block", func.name()),
            ),
            config.max_diagnostics,
        );
        tracing::debug!(func = %func.name(), "function has no entry block");
        return report;
    }

    let mut cfg = ControlFlowGraph::new();
    cfg.compute(module, func_ref);

    let mut reachable = FxHashSet::default();
    for block in cfg.post_order() {
        tracing::trace!(func = %func.name(), block = %module.block(block).name(), "reached");
        reachable.insert(block);
    }

    for block in func.iter_block() {
        if reachable.contains(&block) {
            continue;
        }

        let location = Location::Block {
            func: func_ref,
            block,
        };
        let message = format!(
            "block `{}` in function `{}` is unreachable from the entry block",
            module.block(block).name(),
            func.name()
        );
        let diagnostic = if config.allow_unreachable_blocks {
            Diagnostic::warning(DiagnosticCode::UnreachableBlock, location, message)
        } else {
            Diagnostic::error(DiagnosticCode::UnreachableBlock, location, message)
        };
        report.push(diagnostic, config.max_diagnostics);
    }

    if report.has_errors() {
        tracing::debug!(func = %func.name(), "function failed verification");
    }
    report
}

pub fn verify_module(module: &Module, config: &VerifierConfig) -> VerificationReport {
    let mut report = VerificationReport::default();
    for func_ref in module.iter_functions() {
        let func_report = verify_function(module, func_ref, config);
        report.extend_with_limit(func_report, config.max_diagnostics);
    }
    report
}
