use crate::program::Program;
use crate::Result;
use std::fs;
use std::path::Path;

pub fn save_program(program: &Program, path: impl AsRef<Path>) -> Result<()> {
    let json = program.to_json_string()?;
    fs::write(path, json)?;
    Ok(())
}

/// Reads a program written by [`save_program`] (or by a front end) and checks its arenas.
pub fn load_program(path: impl AsRef<Path>) -> Result<Program> {
    let json = fs::read_to_string(path)?;
    Program::from_json_str(&json)
}
