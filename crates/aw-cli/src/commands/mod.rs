pub mod factions;
pub mod races;
pub mod run;
pub mod snapshot;
pub mod valley;

use std::path::{Path, PathBuf};

use tracing::debug;

use aw_simulation::{GameSession, Scenario, SessionConfig, TickInput, parse_script};

/// Everything needed to build and drive a session.
pub struct SessionSource {
    pub scenario: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub input: Option<String>,
    pub seed: u64,
    pub spawn_interval: u64,
}

impl SessionSource {
    /// Load the scenario and build a session from it.
    fn session(&self) -> Result<(String, GameSession), String> {
        let scenario = match &self.scenario {
            Some(path) => Scenario::load(path)
                .map_err(|e| format!("cannot load scenario {}: {e}", path.display()))?,
            None => Scenario::valley(),
        };
        let name = scenario.name.clone();
        let config = SessionConfig::default()
            .with_seed(self.seed)
            .with_spawn_interval(self.spawn_interval);
        let session = scenario
            .into_session(config)
            .map_err(|e| format!("invalid scenario '{name}': {e}"))?;
        Ok((name, session))
    }

    /// Parse the script file or inline input. No input means no ticks.
    fn inputs(&self) -> Result<Vec<TickInput>, String> {
        let text = match (&self.script, &self.input) {
            (Some(path), _) => read_script(path)?,
            (None, Some(inline)) => inline.clone(),
            (None, None) => String::new(),
        };
        let inputs = parse_script(&text).map_err(|e| e.to_string())?;
        debug!(ticks = inputs.len(), "script parsed");
        Ok(inputs)
    }

    /// Build the session and play every input, stopping when it ends.
    pub fn play(&self) -> Result<(String, GameSession), String> {
        let inputs = self.inputs()?;
        let (name, mut session) = self.session()?;
        session
            .run(inputs)
            .map_err(|e| format!("session error: {e}"))?;
        Ok((name, session))
    }
}

fn read_script(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

/// Write `text` to `output`, or print it when no path is given.
fn write_output(text: &str, output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            println!("  Wrote {}", path.display());
            Ok(())
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
