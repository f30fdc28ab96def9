use std::path::Path;

use aw_simulation::Scenario;

use super::write_output;

pub fn run(output: Option<&Path>) -> Result<(), String> {
    let json = Scenario::valley().to_json().map_err(|e| e.to_string())?;
    write_output(&json, output)
}
