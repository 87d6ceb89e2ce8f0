//! Halo CLI: run the XR session loop or dump runtime capabilities.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{error, info};

use halo_xr::{capabilities, Options, XrProgram};
use halo_xr_openxr::{HostPlatform, VulkanPlugin, VulkanRuntime};

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "halo")]
#[command(about = "OpenXR session sample")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the session loop until the runtime ends it
    Run(RunArgs),

    /// List the runtime's API layers and instance extensions
    Info,

    /// Show version information
    Version,
}

#[derive(ClapArgs, Debug, Default)]
struct RunArgs {
    /// JSON options file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hmd or Handheld
    #[arg(long, env = "HALO_FORM_FACTOR")]
    form_factor: Option<String>,

    /// Mono or Stereo
    #[arg(long, env = "HALO_VIEW_CONFIGURATION")]
    view_configuration: Option<String>,

    /// Opaque, Additive or AlphaBlend
    #[arg(long, env = "HALO_BLEND_MODE")]
    blend_mode: Option<String>,

    /// Reference space the scene is rendered in
    #[arg(long, env = "HALO_APP_SPACE")]
    app_space: Option<String>,
}

impl RunArgs {
    fn options(&self) -> Result<Options> {
        let base = match &self.config {
            Some(path) => halo_common::config::load_json(path)
                .with_context(|| format!("loading options from {}", path.display()))?,
            None => Options::default(),
        };
        Ok(self.apply(base))
    }

    fn apply(&self, mut options: Options) -> Options {
        if let Some(value) = &self.form_factor {
            options.form_factor = value.clone();
        }
        if let Some(value) = &self.view_configuration {
            options.view_configuration = value.clone();
        }
        if let Some(value) = &self.blend_mode {
            options.environment_blend_mode = value.clone();
        }
        if let Some(value) = &self.app_space {
            options.app_space = value.clone();
        }
        options
    }
}

type Program = XrProgram<VulkanRuntime, VulkanPlugin, HostPlatform>;

fn build_program(options: &Options) -> Result<Program> {
    let runtime = VulkanRuntime::load()?;
    let mut program = XrProgram::new(runtime, options.clone(), HostPlatform, VulkanPlugin::new());
    program.create_instance()?;
    program.initialize_system()?;
    program.initialize_session()?;
    program.create_swapchains()?;
    Ok(program)
}

/// Drive one program until the runtime ends the session. Returns whether a
/// fresh instance was requested.
fn run_session(program: &mut Program) -> Result<bool> {
    loop {
        let outcome = program.poll_events()?;
        if outcome.exit_render_loop {
            return Ok(outcome.request_restart);
        }

        if program.is_session_running() {
            program.poll_actions()?;
            program.render_frame()?;
        } else {
            // Nothing to render until the runtime moves the session to ready.
            thread::sleep(IDLE_POLL_INTERVAL);
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let options = args.options()?;
    info!(
        "starting: form factor {}, view configuration {}, blend mode {}, app space {}",
        options.form_factor,
        options.view_configuration,
        options.environment_blend_mode,
        options.app_space
    );

    loop {
        let mut program = build_program(&options)?;
        let restart = run_session(&mut program)?;
        // Handles are released here, before any replacement instance exists.
        drop(program);
        if !restart {
            info!("session ended");
            return Ok(());
        }
        info!("restart requested, recreating instance");
    }
}

fn info() -> Result<()> {
    let runtime = VulkanRuntime::load()?;

    let layers = capabilities::api_layers(&runtime)?;
    println!("API layers ({}):", layers.len());
    for layer in layers {
        println!(
            "  {} v{} (spec {}): {}",
            layer.layer_name, layer.layer_version, layer.spec_version, layer.description
        );
    }

    let extensions = capabilities::instance_extensions(&runtime)?;
    println!("Instance extensions ({}):", extensions.len());
    for extension in extensions {
        println!("  {extension}");
    }
    Ok(())
}

fn main() -> Result<()> {
    halo_common::init_tracing();

    let args = Args::parse();

    let result = match args.command {
        Command::Run(run_args) => run(run_args),
        Command::Info => info(),
        Command::Version => {
            println!("halo {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };
    if let Err(err) = &result {
        error!("{err:#}");
    }
    result
}
