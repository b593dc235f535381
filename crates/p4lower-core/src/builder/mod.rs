/*! Fluent API for constructing programs by hand.
 *
 * Front ends hand over finished arenas, but tests and tools need to assemble small programs
 * directly. The builder numbers expressions in allocation order, resolves field references by
 * name, and derives result types for the common operators.
 */

pub mod program_builder;

pub use program_builder::ProgramBuilder;
