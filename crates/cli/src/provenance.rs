use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata recorded next to a result bundle.
pub struct Payload {
    pub params: Value,
    pub inputs: Vec<String>,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            inputs: Vec::new(),
        }
    }

    pub fn with_inputs<'a, I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = &'a P>,
        P: AsRef<Path> + ?Sized + 'a,
    {
        self.inputs
            .extend(paths.into_iter().map(|p| p.as_ref().to_string_lossy().into_owned()));
        self
    }
}

#[derive(Serialize)]
struct Callsite {
    file: &'static str,
    line: u32,
}

/// Sidecar document; field order is the order written.
#[derive(Serialize)]
struct Sidecar<'a> {
    code_rev: String,
    ulam_version: &'static str,
    callsite: Callsite,
    params: &'a Value,
    inputs: &'a [String],
    outputs: [String; 1],
}

/// Write `<bundle stem>.provenance.json` next to `artifact`.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let caller = Location::caller();
    let artifact = artifact.as_ref();
    let path = provenance_path(artifact);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let doc = Sidecar {
        code_rev: current_git_rev(),
        ulam_version: ulam::VERSION,
        callsite: Callsite {
            file: caller.file(),
            line: caller.line(),
        },
        params: &payload.params,
        inputs: &payload.inputs,
        outputs: [artifact.to_string_lossy().into_owned()],
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("bundle"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Build-time `GIT_COMMIT`, then runtime `GIT_COMMIT`, then `git rev-parse HEAD`.
pub fn current_git_rev() -> String {
    let baked = option_env!("GIT_COMMIT").map(str::to_string);
    if let Some(rev) = baked
        .into_iter()
        .chain(std::env::var("GIT_COMMIT").ok())
        .find(|r| !r.is_empty())
    {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_next_to_the_bundle() {
        let derived = provenance_path(Path::new("/tmp/runs/gulf.json"));
        assert_eq!(derived, Path::new("/tmp/runs/gulf.provenance.json"));
    }

    #[test]
    fn sidecar_lists_inputs_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("bundle.json");
        fs::write(&artifact, "{}").unwrap();
        let traj = dir.path().join("traj.csv");
        let payload = Payload::new(json!({"poly_type": "hex"})).with_inputs([&traj]);
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["inputs"][0], traj.to_string_lossy().as_ref());
        assert_eq!(parsed["params"]["poly_type"], "hex");
        assert_eq!(parsed["ulam_version"], ulam::VERSION);
    }
}
