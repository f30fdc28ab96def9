use std::path::Path;

use super::{SessionSource, write_output};

pub fn run(source: &SessionSource, output: Option<&Path>) -> Result<(), String> {
    let (_, session) = source.play()?;
    let json = session
        .snapshot()
        .and_then(|s| s.to_json())
        .map_err(|e| format!("cannot snapshot session: {e}"))?;
    write_output(&json, output)
}
