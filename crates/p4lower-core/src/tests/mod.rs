/*! Unit coverage for the IR model.
 *
 * Lowering reads these structures without re-checking them, so the builder, the arena
 * validation and the type helpers are exercised here against the shapes lowering relies on.
 */

#![allow(unused_imports)]
#![allow(unused_variables)]

mod type_tests;
