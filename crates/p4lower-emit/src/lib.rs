/*! Lower typed P4 IR into C fragments for a packet-pipeline runtime.
 *
 * Every top-level statement comes out as three pieces: code hoisted in front of it (temporary
 * buffers, forward declarations), the statement itself, and code that must run after it (field
 * write-backs, settling delays). Nothing in here touches a packet. It only writes the C that will,
 * so bit-exact semantics are spelled out in the generated text instead of left to the C compiler.
 *
 * Problems are collected as diagnostics rather than raised one at a time, so a single run reports
 * everything that keeps a program from lowering cleanly.
 */

pub mod bits;
pub mod config;
pub mod context;
pub mod conventions;
pub mod diagnostics;
pub mod emitter;
pub mod error;
pub mod fragment;
pub mod lowering;
pub mod naming;

pub use config::{IndentStyle, LoweringConfig};
pub use context::EmissionContext;
pub use diagnostics::{Category, Diagnostic, Diagnostics, Severity};
pub use emitter::CodeWriter;
pub use error::{LoweringError, Result};
pub use fragment::{join_code, FragmentKind, LoweredFragment};
pub use lowering::{
    call_convention, group_adjacent_fields, CallConvention, ExprMode, FieldRun, LoweringSession,
    TypeStyle,
};
pub use naming::NameAllocator;
