//! CF-015: CLI subcommands: whoami, synth, validate, init.

use crate::core::{assembly, config, stack, synth, validate};
use crate::error::{Error, Result};
use crate::identity::{report, sts::StsIdentityService, SessionContext};
use aws_config::BehaviorVersion;
use clap::Subcommand;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the AWS identity and default region of the configured credentials
    Whoami,

    /// Synthesize the stack into a CloudFormation template
    Synth {
        /// Path to cflab.yaml (defaults apply if it does not exist)
        #[arg(short, long, default_value = "cflab.yaml")]
        file: PathBuf,

        /// Assembly output directory (overrides out_dir from the config)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the template to stdout instead of writing an assembly
        #[arg(long)]
        stdout: bool,
    },

    /// Validate cflab.yaml and the stack it produces
    Validate {
        /// Path to cflab.yaml
        #[arg(short, long, default_value = "cflab.yaml")]
        file: PathBuf,
    },

    /// Write a starter cflab.yaml
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// Dispatch a CLI command.
pub async fn dispatch(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Whoami => cmd_whoami().await,
        Commands::Synth { file, out, stdout } => {
            let mut sink = std::io::stdout().lock();
            cmd_synth(&file, out.as_deref(), stdout, &mut sink)
        }
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Init { path } => cmd_init(&path),
    }
}

async fn cmd_whoami() -> Result<()> {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let session = SessionContext::from_sdk_config(&sdk_config);
    let service = StsIdentityService::new(&sdk_config);
    let mut out = std::io::stdout().lock();
    report::report(&service, &session, &mut out).await
}

/// Load and validate the config file, reporting each error on stderr.
fn load_and_validate(file: &Path) -> Result<config::LabConfig> {
    let cfg = config::load_config(file)?;
    let errors = config::validate_config(&cfg);
    if errors.is_empty() {
        return Ok(cfg);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err(Error::config(format!("{} validation error(s)", errors.len())))
}

fn cmd_synth<W: Write>(file: &Path, out_dir: Option<&Path>, to_stdout: bool, sink: &mut W) -> Result<()> {
    let cfg = load_and_validate(file)?;
    let graph = stack::infra_stack(&cfg.stack_id, &cfg.stack_options());
    let template = synth::synthesize(&graph)?;

    if to_stdout {
        sink.write_all(synth::to_json(&template)?.as_bytes())?;
        return Ok(());
    }

    let out_dir = out_dir.unwrap_or(cfg.out_dir.as_path());
    let info = assembly::write_assembly(out_dir, &graph, &template)?;
    writeln!(
        sink,
        "Synthesized {} ({} resources, {} outputs)",
        graph.stack_id,
        template.resources.len(),
        template.outputs.len()
    )?;
    writeln!(sink, "  Template: {}", info.template_path.display())?;
    writeln!(sink, "  Manifest: {}", info.manifest_path.display())?;
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<()> {
    let cfg = load_and_validate(file)?;
    let graph = stack::infra_stack(&cfg.stack_id, &cfg.stack_options());
    let errors = validate::validate_graph(&graph);

    if errors.is_empty() {
        println!(
            "OK: {} ({} resources, {} outputs)",
            graph.stack_id,
            graph.resources.len(),
            graph.outputs.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(Error::Validation(format!("{} validation error(s)", errors.len())))
    }
}

fn cmd_init(path: &Path) -> Result<()> {
    let config_path = path.join("cflab.yaml");
    if config_path.exists() {
        return Err(Error::config(format!("{} already exists", config_path.display())));
    }
    std::fs::create_dir_all(path)?;
    std::fs::write(&config_path, config::STARTER_CONFIG)?;

    println!("Initialized cflab project at {}", path.display());
    println!("  Created: {}", config_path.display());
    Ok(())
}
