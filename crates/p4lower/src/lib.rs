/*! One import for lowering P4 programs to packet-pipeline C.
 *
 * Build or load a typed [`Program`], open a [`LoweringSession`] for the compilation run, and lower
 * statements, expressions and declarations one at a time. Each result is a [`LoweredFragment`]
 * whose hoisted code the caller places around the statement it belongs to.
 */

pub use p4lower_core as core;
pub use p4lower_emit as emit;

pub use p4lower_core::{
    load_program, save_program, BlockId, DeclId, Expr, ExprId, ExprKind, Program, ProgramBuilder,
    Statement, Type,
};

pub use p4lower_emit::{
    Diagnostic, Diagnostics, ExprMode, LoweredFragment, LoweringConfig, LoweringError,
    LoweringSession, TypeStyle,
};
