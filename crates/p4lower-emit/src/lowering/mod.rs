/*! Recursive translation of IR nodes into packet-pipeline C.
 *
 * A [`LoweringSession`] lives for a whole compilation run and owns what must survive between
 * statements: the name allocator, the set of expressions whose buffers were already assembled,
 * the caller's type aliases and the diagnostics. Each call into the session builds a short-lived
 * [`Lowering`] engine around a fresh [`EmissionContext`], so hoisted code never leaks from one
 * top-level statement into the next.
 */

mod arithmetic;
mod assignments;
mod declarations;
mod digest;
mod expressions;
mod externs;
mod lists;
mod methods;
mod select;
mod statements;
mod types;

pub use externs::{call_convention, CallConvention};
pub use lists::{group_adjacent_fields, FieldRun};
pub use types::TypeStyle;

use crate::config::LoweringConfig;
use crate::context::EmissionContext;
use crate::diagnostics::{Category, Diagnostics};
use crate::error::Result;
use crate::fragment::LoweredFragment;
use crate::naming::NameAllocator;
use indexmap::IndexMap;
use p4lower_core::{BlockId, DeclId, ExprId, Program, Statement, Type};
use std::collections::HashSet;

/// How an expression is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprMode {
    /// Header fields read their value; otherwise they render as field handles.
    pub as_value: bool,
    /// Unqualified names of non-local declarations render as `parameters.<name>`.
    pub expand_parameters: bool,
}

impl ExprMode {
    pub const VALUE: ExprMode = ExprMode {
        as_value: true,
        expand_parameters: false,
    };

    pub const HANDLE: ExprMode = ExprMode {
        as_value: false,
        expand_parameters: false,
    };

    pub const EXPANDED: ExprMode = ExprMode {
        as_value: true,
        expand_parameters: true,
    };

    /// Mode for sub-expressions: always values, expansion carried over.
    pub(crate) fn child(self) -> ExprMode {
        ExprMode {
            as_value: true,
            expand_parameters: self.expand_parameters,
        }
    }
}

impl Default for ExprMode {
    fn default() -> Self {
        ExprMode::VALUE
    }
}

/// Run-scoped lowering state.
#[derive(Debug)]
pub struct LoweringSession {
    config: LoweringConfig,
    names: NameAllocator,
    generated_exprs: HashSet<ExprId>,
    type_env: IndexMap<String, String>,
    diagnostics: Diagnostics,
}

impl LoweringSession {
    pub fn new(config: LoweringConfig) -> Self {
        Self {
            config,
            names: NameAllocator::new(),
            generated_exprs: HashSet::new(),
            type_env: IndexMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn config(&self) -> &LoweringConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn names_mut(&mut self) -> &mut NameAllocator {
        &mut self.names
    }

    /// Aliases forcing named types to render as specific strings.
    pub fn type_env(&self) -> &IndexMap<String, String> {
        &self.type_env
    }

    pub fn type_env_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.type_env
    }

    pub fn is_generated(&self, expr: ExprId) -> bool {
        self.generated_exprs.contains(&expr)
    }

    /// Lowers one top-level statement into its (pre, main, post) triple.
    ///
    /// Errors that make the statement meaningless abort it and are also recorded as diagnostics;
    /// everything else is recorded and lowering carries on with partial output.
    pub fn lower_statement(
        &mut self,
        program: &Program,
        stmt: &Statement,
        scope: Option<BlockId>,
    ) -> Result<LoweredFragment> {
        tracing::debug!(kind = stmt.node_name(), "lowering statement");
        let mut lowering = Lowering::new(program, self, scope);
        let result = lowering.statement(stmt);
        let (pre, post) = lowering.ctx.drain();
        match result {
            Ok(text) => {
                tracing::trace!(pre = pre.len(), post = post.len(), "statement lowered");
                Ok(LoweredFragment::statements(text).with_hoisted(pre, post))
            }
            Err(err) => {
                self.diagnostics.record("lowering statement", &err);
                Err(err)
            }
        }
    }

    pub fn lower_expression(
        &mut self,
        program: &Program,
        expr: ExprId,
        scope: Option<BlockId>,
        mode: ExprMode,
    ) -> Result<LoweredFragment> {
        let mut lowering = Lowering::new(program, self, scope);
        let result = lowering.expr(expr, mode);
        let (pre, post) = lowering.ctx.drain();
        match result {
            Ok(text) => Ok(LoweredFragment::expression(text).with_hoisted(pre, post)),
            Err(err) => {
                self.diagnostics.record("lowering expression", &err);
                Err(err)
            }
        }
    }

    pub fn lower_declaration(
        &mut self,
        program: &Program,
        decl: DeclId,
        scope: Option<BlockId>,
        name_override: Option<&str>,
    ) -> Result<LoweredFragment> {
        let mut lowering = Lowering::new(program, self, scope);
        let result = lowering.declaration(decl, name_override);
        let (pre, post) = lowering.ctx.drain();
        match result {
            Ok(text) => Ok(LoweredFragment::statements(text).with_hoisted(pre, post)),
            Err(err) => {
                self.diagnostics.record("formatting declaration", &err);
                Err(err)
            }
        }
    }

    pub fn format_type(&mut self, program: &Program, ty: &Type, style: TypeStyle) -> String {
        Lowering::new(program, self, None).format_type(ty, style)
    }

    /// Type text with `var_name` placed between the type and any array suffix.
    pub fn format_declared_type(&mut self, program: &Program, ty: &Type, var_name: &str) -> String {
        Lowering::new(program, self, None).format_declared_type(ty, var_name, true)
    }
}

impl Default for LoweringSession {
    fn default() -> Self {
        Self::new(LoweringConfig::default())
    }
}

/// The transient engine behind one session call.
pub(crate) struct Lowering<'a> {
    pub(crate) program: &'a Program,
    pub(crate) session: &'a mut LoweringSession,
    pub(crate) ctx: EmissionContext,
}

impl<'a> Lowering<'a> {
    pub(crate) fn new(
        program: &'a Program,
        session: &'a mut LoweringSession,
        scope: Option<BlockId>,
    ) -> Self {
        Self {
            program,
            session,
            ctx: EmissionContext::new(scope),
        }
    }

    pub(crate) fn config(&self) -> &LoweringConfig {
        &self.session.config
    }

    pub(crate) fn traces(&self) -> bool {
        self.session.config.emit_debug_traces
    }

    pub(crate) fn error(&mut self, category: Category, stage: &str, message: impl Into<String>) {
        self.session.diagnostics.error(category, stage, message);
    }

    pub(crate) fn warning(&mut self, stage: &str, message: impl Into<String>) {
        self.session.diagnostics.warning(stage, message);
    }

    pub(crate) fn fresh_name(&mut self, hint: &str) -> String {
        self.session.names.fresh(hint)
    }

    pub(crate) fn name_for(&mut self, hint: &str, id: impl ToString) -> String {
        self.session.names.allocate(hint, Some(&id.to_string()))
    }

    /// Marks `expr` as lowered; false when it already was during this run.
    pub(crate) fn mark_generated(&mut self, expr: ExprId) -> bool {
        let fresh = self.session.generated_exprs.insert(expr);
        if !fresh {
            tracing::trace!(expr = %expr, "buffer already assembled");
        }
        fresh
    }

    pub(crate) fn is_local(&self, decl: DeclId) -> bool {
        self.ctx
            .scope()
            .map(|block| self.program.is_local_of(block, decl))
            .unwrap_or(false)
    }
}
