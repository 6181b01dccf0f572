//! Matching script hook.
//!
//! A script gets the remote values and the current candidate as JSON on
//! stdin and may answer with overrides as JSON on stdout. Absent fields mean
//! "no override". The call is synchronous and not preemptible.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::core::model::AircraftModel;
use crate::core::remote::{NetworkValues, RemoteAircraft};

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to run script {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Script {path} exited with {status}: {stderr}")]
    ExitStatus {
        path: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Script {path} returned invalid output: {source}")]
    InvalidOutput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStage {
    ReverseLookup,
    MatchingStage,
}

impl std::fmt::Display for ScriptStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReverseLookup => write!(f, "reverse lookup"),
            Self::MatchingStage => write!(f, "matching stage"),
        }
    }
}

/// What a script receives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingScriptInput {
    pub stage: ScriptStage,
    pub callsign: String,
    /// Untouched network strings
    pub network: NetworkValues,
    /// Best values resolved so far
    pub aircraft_icao: String,
    pub airline_icao: String,
    pub livery: String,
    pub combined_type: String,
    /// Matched model, only in the matching stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<AircraftModel>,
    /// Number of models in the active set
    pub model_set_count: usize,
}

impl MatchingScriptInput {
    pub fn new(stage: ScriptStage, remote: &RemoteAircraft, candidate: &AircraftModel) -> Self {
        Self {
            stage,
            callsign: remote.callsign.clone(),
            network: remote.network.clone(),
            aircraft_icao: candidate.aircraft_icao.designator.clone(),
            airline_icao: candidate.airline().designator.clone(),
            livery: candidate.livery.combined_code.clone(),
            combined_type: candidate.combined_type().unwrap_or_default().to_string(),
            model: None,
            model_set_count: 0,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: &AircraftModel, model_set_count: usize) -> Self {
        self.model = Some(model.clone());
        self.model_set_count = model_set_count;
        self
    }
}

/// Overrides returned by a script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptReturnValues {
    pub aircraft_icao: Option<String>,
    pub airline_icao: Option<String>,
    pub livery: Option<String>,
    pub model_string: Option<String>,
    /// Free text appended to the matching log
    pub log_message: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl ScriptReturnValues {
    pub fn aircraft_icao(&self) -> Option<&str> {
        non_empty(self.aircraft_icao.as_ref())
    }

    pub fn airline_icao(&self) -> Option<&str> {
        non_empty(self.airline_icao.as_ref())
    }

    pub fn livery(&self) -> Option<&str> {
        non_empty(self.livery.as_ref())
    }

    pub fn model_string(&self) -> Option<&str> {
        non_empty(self.model_string.as_ref())
    }

    /// At least one ICAO or livery override
    pub fn has_icao_overrides(&self) -> bool {
        self.aircraft_icao().is_some() || self.airline_icao().is_some() || self.livery().is_some()
    }

    pub fn has_overrides(&self) -> bool {
        self.has_icao_overrides() || self.model_string().is_some()
    }
}

/// Runs matching scripts
pub trait ScriptEngine: Send + Sync {
    fn run(&self, script: &Path, input: &MatchingScriptInput) -> Result<ScriptReturnValues, ScriptError>;
}

/// Runs a script as a child process, optionally through an interpreter
#[derive(Debug, Clone, Default)]
pub struct ProcessScriptEngine {
    interpreter: Option<PathBuf>,
}

impl ProcessScriptEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run scripts as `<interpreter> <script>`, e.g. `python3`
    pub fn with_interpreter(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: Some(interpreter.into()),
        }
    }

    fn command(&self, script: &Path) -> Command {
        match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(script);
                cmd
            }
            None => Command::new(script),
        }
    }
}

impl ScriptEngine for ProcessScriptEngine {
    fn run(&self, script: &Path, input: &MatchingScriptInput) -> Result<ScriptReturnValues, ScriptError> {
        let spawn_error = |source| ScriptError::Spawn {
            path: script.to_path_buf(),
            source,
        };
        let payload = serde_json::to_vec(input).map_err(|source| ScriptError::InvalidOutput {
            path: script.to_path_buf(),
            source,
        })?;

        let mut cmd = self.command(script);
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
        tracing::debug!("executing {cmd:?}");

        let mut child = cmd.spawn().map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            // a script may exit without reading its input
            if let Err(e) = stdin.write_all(&payload) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(spawn_error(e));
                }
            }
        }
        let output = child.wait_with_output().map_err(spawn_error)?;

        if !output.status.success() {
            return Err(ScriptError::ExitStatus {
                path: script.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(ScriptReturnValues::default());
        }
        serde_json::from_str(stdout.trim()).map_err(|source| ScriptError::InvalidOutput {
            path: script.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::icao::{AircraftIcaoCode, Livery};

    fn input() -> MatchingScriptInput {
        let remote = RemoteAircraft::from_network("DLH123", "A320", "DLH", "", "");
        MatchingScriptInput::new(ScriptStage::ReverseLookup, &remote, &remote.model)
    }

    #[test]
    fn test_input_carries_network_and_resolved_values() {
        let input = input();
        assert_eq!(input.callsign, "DLH123");
        assert_eq!(input.network.aircraft_icao, "A320");
        assert_eq!(input.airline_icao, "DLH");
        assert!(input.model.is_none());

        let model = AircraftModel::new("A320_DLH", AircraftIcaoCode::new("A320"), Livery::default());
        let json = serde_json::to_string(&input.with_model(&model, 12)).unwrap();
        assert!(json.contains("\"model_set_count\":12"));
        assert!(json.contains("\"stage\":\"reverse_lookup\""));
    }

    #[test]
    fn test_return_values_ignore_blank_fields() {
        let values: ScriptReturnValues =
            serde_json::from_str(r#"{"aircraft_icao": " ", "model_string": "B738_DLH"}"#).unwrap();
        assert!(values.aircraft_icao().is_none());
        assert!(!values.has_icao_overrides());
        assert!(values.has_overrides());
        assert!(!ScriptReturnValues::default().has_overrides());
    }

    #[cfg(unix)]
    fn write_script(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("matching.sh");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_process_engine_returns_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            &dir,
            "cat > /dev/null\necho '{\"aircraft_icao\": \"B738\", \"log_message\": \"forced\"}'\n",
        );
        let engine = ProcessScriptEngine::with_interpreter("sh");
        let values = engine.run(&script, &input()).unwrap();
        assert_eq!(values.aircraft_icao(), Some("B738"));
        assert_eq!(values.log_message.as_deref(), Some("forced"));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_engine_empty_output_means_no_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "exit 0\n");
        let engine = ProcessScriptEngine::with_interpreter("sh");
        assert!(!engine.run(&script, &input()).unwrap().has_overrides());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_engine_errors() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ProcessScriptEngine::with_interpreter("sh");

        let failing = write_script(&dir, "echo broken >&2\nexit 3\n");
        assert!(matches!(
            engine.run(&failing, &input()),
            Err(ScriptError::ExitStatus { .. })
        ));

        let garbage = write_script(&dir, "echo 'not json'\n");
        assert!(matches!(
            engine.run(&garbage, &input()),
            Err(ScriptError::InvalidOutput { .. })
        ));

        let missing = ProcessScriptEngine::new();
        assert!(matches!(
            missing.run(Path::new("/nonexistent/script"), &input()),
            Err(ScriptError::Spawn { .. })
        ));
    }
}
