mod cli;

use tbtools::{
    config::{ConfigStore, ToolConfig, CONFIG_KEYS},
    host::{self, Tool, ToolEntry},
    tools::{Mp4Splitter, SceneJob, SceneSetup, SceneSetupRequest, SplitInput, SplitRequest},
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ConfigAction, HarmonyArgs, ImportArgs, SetupArgs, SplitArgs};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tbtools_av::timecode::{parse_frame_rate, parse_lines};

/// Exit code for input, manifest and setup problems.
const EXIT_FAILURE: u8 = 1;
/// Exit code when ffmpeg or Harmony itself failed.
const EXIT_TOOL_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "tbtools=debug,tbtools_av=debug,tbtools_scene=debug,tbtools_common=debug".to_string()
        } else {
            "tbtools=warn,tbtools_av=warn,tbtools_scene=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut store = ConfigStore::open(cli.config.as_deref())?;

    let code = match cli.command {
        Commands::Split(args) => split(&mut store, args)?,
        Commands::Setup(args) => setup(&mut store, args)?,
        Commands::ImportAnimatic(args) => import_animatic(&mut store, args)?,
        Commands::Tools { name } => list_tools(name.as_deref()),
        Commands::CheckTools => {
            check_tools(&store.config);
            ExitCode::SUCCESS
        }
        Commands::Config { action } => {
            config_command(&mut store, action)?;
            ExitCode::SUCCESS
        }
        Commands::Version => {
            println!("tbtools {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
    };

    if store.save_if_modified()? {
        tracing::info!("Saved config to {:?}", store.path());
    }

    Ok(code)
}

/// Apply command-line overrides for this run, and to the saved config when
/// `remember` is set.
fn with_overrides(
    store: &mut ConfigStore,
    overrides: &[(&str, Option<&String>)],
    remember: bool,
) -> Result<ToolConfig> {
    let mut config = store.config.clone();
    for (key, value) in overrides {
        if let Some(value) = value {
            config.set(key, value)?;
            if remember {
                store.set(key, value)?;
            }
        }
    }
    Ok(config)
}

fn split(store: &mut ConfigStore, args: SplitArgs) -> Result<ExitCode> {
    let config = with_overrides(
        store,
        &[
            ("ffmpeg_path", args.ffmpeg.as_ref()),
            ("ffprobe_path", args.ffprobe.as_ref()),
        ],
        args.remember,
    )?;

    let input = if let Some(path) = &args.frames_file {
        SplitInput::FrameCounts(read_lines(path)?)
    } else if let Some(path) = &args.timestamps_file {
        SplitInput::Timestamps(read_lines(path)?)
    } else if !args.timestamps.is_empty() {
        SplitInput::Timestamps(args.timestamps)
    } else {
        SplitInput::FrameCounts(args.frames)
    };

    let fps = args.fps.as_deref().map(parse_frame_rate).transpose()?;

    let tool = Mp4Splitter::new(SplitRequest {
        master: args.master,
        output_dir: args.output_dir,
        start_index: args.start_index,
        input,
        fps,
        dry_run: args.dry_run,
    });
    run_and_report(Box::new(tool), config)
}

fn harmony_overrides<'a>(
    harmony: &'a HarmonyArgs,
    script_key: &'a str,
) -> [(&'a str, Option<&'a String>); 3] {
    [
        ("harmony_exe", harmony.harmony_exe.as_ref()),
        (script_key, harmony.script.as_ref()),
        ("harmony_log_dir", harmony.log_dir.as_ref()),
    ]
}

fn setup(store: &mut ConfigStore, args: SetupArgs) -> Result<ExitCode> {
    let overrides = harmony_overrides(&args.harmony, "harmony_script");
    let config = with_overrides(store, &overrides, args.harmony.remember)?;

    let tool = SceneSetup::new(SceneSetupRequest {
        job: SceneJob::Setup {
            manifest: args.manifest,
        },
        scenes: args.scenes,
        dry_run: args.harmony.dry_run,
    });
    run_and_report(Box::new(tool), config)
}

fn import_animatic(store: &mut ConfigStore, args: ImportArgs) -> Result<ExitCode> {
    let mut overrides = harmony_overrides(&args.harmony, "harmony_import_script").to_vec();
    overrides.push(("scenes_root", args.scenes_root.as_ref()));
    overrides.push(("animatics_root", args.animatics_root.as_ref()));
    let config = with_overrides(store, &overrides, args.harmony.remember)?;

    let mut scenes = args.scenes.clone();
    if let Some(path) = &args.scenes_file {
        scenes.extend(read_lines(path)?);
    }

    let tool = SceneSetup::new(SceneSetupRequest {
        job: SceneJob::ImportAnimatic {
            manifest: args.manifest.clone(),
        },
        scenes,
        dry_run: args.harmony.dry_run,
    });
    run_and_report(Box::new(tool), config)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    Ok(parse_lines(&text))
}

/// Run a tool, stream its log to stdout and print the outcome.
fn run_and_report(tool: Box<dyn Tool>, config: ToolConfig) -> Result<ExitCode> {
    let report = host::run_tool(tool, Arc::new(config), |line| println!("{}", line))?;

    match report.outcome {
        Ok(summary) => {
            println!();
            println!("✓ {}: {}", report.tool, summary);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_external_failure() => {
            eprintln!();
            eprintln!("✗ {}: external tool error", report.tool);
            eprintln!("  {}", e);
            Ok(ExitCode::from(EXIT_TOOL_FAILURE))
        }
        Err(e) => {
            eprintln!();
            eprintln!("✗ {}: {}", report.tool, e);
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}

fn list_tools(name: Option<&str>) -> ExitCode {
    let tools: Vec<&ToolEntry> = match name {
        Some(name) => match host::find_tool(name) {
            Some(tool) => vec![tool],
            None => {
                eprintln!("Unknown tool: {name}");
                return ExitCode::from(EXIT_FAILURE);
            }
        },
        None => host::TOOLS.to_vec(),
    };

    for tool in tools {
        println!("{} ({})", tool.name, tool.commands.join(", "));
        println!("  {}", tool.description);
        for field in tool.fields {
            match field.config_key {
                Some(key) => println!("    {:<16} {} [config: {}]", field.name, field.help, key),
                None => println!("    {:<16} {}", field.name, field.help),
            }
        }
        println!();
    }
    ExitCode::SUCCESS
}

fn check_tools(config: &ToolConfig) {
    println!("Checking external tools...\n");

    let tools = [
        tbtools_av::tools::check_tool("ffmpeg", config.ffmpeg(), "-version"),
        tbtools_av::tools::check_tool("ffprobe", config.ffprobe(), "-version"),
        tbtools_av::tools::check_executable("Harmony", &config.harmony_exe),
    ];
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    for (name, script) in [
        ("setup script", &config.harmony_script),
        ("import script", &config.harmony_import_script),
    ] {
        let found = Path::new(script).is_file();
        all_ok &= found;
        println!("{} {} - {}", if found { "✓" } else { "✗" }, name, script);
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install them to enable all features.");
    }
}

fn config_command(store: &mut ConfigStore, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", store.path().display());
            for key in CONFIG_KEYS {
                let value = store.config.get(key).unwrap_or_default();
                println!("{} = {:?}", key, value);
            }
        }
        ConfigAction::Set { key, value } => {
            store.set(&key, &value)?;
            println!("✓ {} = {:?}", key, value);
        }
        ConfigAction::Path => {
            println!("{}", store.path().display());
        }
    }
    Ok(())
}
