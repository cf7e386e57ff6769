//! CF-011: Cloud assembly output: template and manifest, written atomically.
//!
//! Layout of the assembly directory:
//!
//! ```text
//! <out_dir>/
//!   manifest.json
//!   <StackId>.template.json
//! ```

use super::hasher::hash_string;
use super::synth::to_json;
use super::types::{ResourceGraph, Template};
use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cloud assembly schema version written to the manifest.
pub const ASSEMBLY_VERSION: &str = "36.0.0";

pub const MANIFEST_FILE: &str = "manifest.json";

/// Assembly manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub artifacts: IndexMap<String, Artifact>,
}

/// One stack artifact in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub environment: String,
    pub properties: ArtifactProperties,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactProperties {
    pub template_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// BLAKE3 of the template text
    pub template_hash: String,
}

/// What a write produced.
#[derive(Debug, Clone)]
pub struct AssemblyInfo {
    pub template_path: PathBuf,
    pub manifest_path: PathBuf,
    pub template_hash: String,
}

/// Template file name for a stack.
pub fn template_file_name(stack_id: &str) -> String {
    format!("{stack_id}.template.json")
}

/// Derive the template path within the assembly directory.
pub fn template_path(out_dir: &Path, stack_id: &str) -> PathBuf {
    out_dir.join(template_file_name(stack_id))
}

/// Build the manifest for a synthesized stack.
pub fn build_manifest(graph: &ResourceGraph, template_hash: &str) -> Manifest {
    let environment = graph.options.env.clone().unwrap_or_default().uri();
    let artifact = Artifact {
        artifact_type: "aws:cloudformation:stack".to_string(),
        environment,
        properties: ArtifactProperties {
            template_file: template_file_name(&graph.stack_id),
            description: graph.options.description.clone(),
            template_hash: template_hash.to_string(),
        },
        display_name: graph.stack_id.clone(),
    };
    Manifest {
        version: ASSEMBLY_VERSION.to_string(),
        artifacts: IndexMap::from([(graph.stack_id.clone(), artifact)]),
    }
}

/// Write the template and manifest into `out_dir`.
pub fn write_assembly(out_dir: &Path, graph: &ResourceGraph, template: &Template) -> Result<AssemblyInfo> {
    std::fs::create_dir_all(out_dir)?;

    let text = to_json(template)?;
    let template_hash = hash_string(&text);
    let template_path = template_path(out_dir, &graph.stack_id);
    write_atomic(&template_path, &text)?;

    let manifest = build_manifest(graph, &template_hash);
    let mut manifest_text = serde_json::to_string_pretty(&manifest)?;
    manifest_text.push('\n');
    let manifest_path = out_dir.join(MANIFEST_FILE);
    write_atomic(&manifest_path, &manifest_text)?;

    tracing::info!(
        template = %template_path.display(),
        hash = %template_hash,
        "wrote cloud assembly"
    );

    Ok(AssemblyInfo {
        template_path,
        manifest_path,
        template_hash,
    })
}

/// Load a manifest from an assembly directory.
pub fn load_manifest(out_dir: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(out_dir.join(MANIFEST_FILE))?;
    Ok(serde_json::from_str(&content)?)
}

/// Atomic write: temp file + rename.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
