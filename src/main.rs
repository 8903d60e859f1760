mod cli;

use mediacompat::{
    compat::{self, MediaDescriptor, StreamType},
    config, probe,
    processor::{self, Processor},
    scanner,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "mediacompat=trace,mediacompat_av=debug".to_string()
        } else {
            "mediacompat=info,mediacompat_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            path,
            dry_run,
            replace,
            jobs,
        } => convert(&path, cli.config.as_deref(), dry_run, replace, jobs),
        Commands::Check { file, json } => check_file(&file, cli.config.as_deref(), json),
        Commands::Probe { file, json } => probe_file(&file, cli.config.as_deref(), json),
        Commands::Table { json } => print_table(cli.config.as_deref(), json),
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("mediacompat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn convert(
    input: &Path,
    config_path: Option<&Path>,
    dry_run: bool,
    replace: bool,
    jobs: usize,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.exists() {
        anyhow::bail!("Input path does not exist: {:?}", input);
    }

    let files = scanner::collect_files(input, config.scan.follow_links)?;
    tracing::info!("Found {} files under {:?}", files.len(), input);

    if dry_run {
        println!("[DRY RUN] No files will be written");
    }

    let processor = Processor::from_config(&config, dry_run, replace);
    let reports = processor.run_batch(&files, jobs, |report| {
        println!("{}", report.lines().join("\n"));
    })?;

    let summary = processor::summarize(&reports);

    println!("Conversion completed");
    println!("{}", summary);
    if summary.failed > 0 {
        println!("{} files failed, see the log for details", summary.failed);
    }

    Ok(())
}

fn check_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let tools = probe::Tools::resolve_lenient(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let media_info = probe::probe_file(file, &tools)?;
    let media = MediaDescriptor::from_media_info(&media_info);
    let plan = config.policy().evaluate(&media);

    if json {
        let json_str = serde_json::to_string_pretty(&plan)?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("File: {}", file.display());
    println!("Container: {}", display_container(&media.container));
    for (i, stream) in media.streams.iter().enumerate() {
        let verdict = if !stream.stream_type.is_convertible() {
            "ignored"
        } else if plan.rejected.iter().any(|r| r.position == i) {
            "not supported"
        } else {
            "ok"
        };
        println!(
            "  [{}] {} {} - {}",
            i, stream.stream_type, stream.codec_name, verdict
        );
    }

    println!();
    if plan.needs_conversion {
        let types: Vec<String> = plan
            .types_to_convert
            .iter()
            .map(|t| t.to_string())
            .collect();
        println!("Needs conversion: {}", types.join(","));
        println!(
            "  Output: {} (video: {}, audio: {})",
            plan.container.as_deref().unwrap_or_default(),
            plan.video_codec,
            plan.audio_codec
        );
        println!(
            "  New file: {}",
            processor::output_path_for(
                file,
                &config.scan.new_suffix,
                &config.target.container
            )
            .display()
        );
    } else {
        println!("No conversion needed");
    }

    Ok(())
}

fn display_container(container: &str) -> &str {
    if container.is_empty() {
        "(none)"
    } else {
        container
    }
}

fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let tools = probe::Tools::resolve_lenient(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let media_info = probe::probe_file(file, &tools)?;

    if json {
        let json_str = serde_json::to_string_pretty(&media_info)?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("File: {}", media_info.file_path.display());
    println!("Format: {}", media_info.format_name);
    println!(
        "Container: {}",
        display_container(&compat::container_from_path(&media_info.file_path))
    );
    println!("Size: {} bytes", media_info.file_size);
    if let Some(ref duration) = media_info.duration {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let hours = mins / 60;
        println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
    }

    println!("\nStreams: {}", media_info.streams.len());
    for stream in &media_info.streams {
        print!("  [{}] {} {}", stream.index, stream.kind, stream.codec);
        if let (Some(width), Some(height)) = (stream.width, stream.height) {
            print!(" {}x{}", width, height);
        }
        if let Some(channels) = stream.channels {
            print!(" {}ch", channels);
        }
        if let Some(ref lang) = stream.language {
            print!(" ({})", lang);
        }
        if stream.default {
            print!(" [default]");
        }
        println!();
    }

    Ok(())
}

fn print_table(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let policy = config.policy();

    if json {
        let json_str = serde_json::to_string_pretty(&policy)?;
        println!("{}", json_str);
        return Ok(());
    }

    println!(
        "Target: {} (video: {}, audio: {})",
        policy.target.container, policy.target.video_codec, policy.target.audio_codec
    );

    for stream_type in StreamType::CONVERTIBLE {
        println!("\n{}:", stream_type);
        for container in policy.table.containers() {
            let allowed = policy.table.allowed_codecs(stream_type, container);
            let codecs: Vec<&str> = allowed.iter().map(String::as_str).collect();
            let codecs = if codecs.is_empty() {
                "(none)".to_string()
            } else {
                codecs.join(", ")
            };
            println!("  {:<8} {}", container, codecs);
        }
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = probe::check_tools();
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

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to convert files.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!(
        "  Target: {}/{}/{}",
        config.target.container, config.target.video_codec, config.target.audio_codec
    );
    println!("  Containers: {}", config.compat.containers().len());
    println!("  Extensions: {}", config.scan.extensions.join(", "));
    println!("  New file suffix: {}", config.scan.new_suffix);

    Ok(())
}
