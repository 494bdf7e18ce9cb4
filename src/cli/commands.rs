// CLI command implementations
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mp3_tagger::{Field, Mp3File, TagVersion};

use crate::cli::{CliError, CliResult, Commands, Config, OutputFormatter};

/// Run the subcommand selected in `config`
pub fn run(config: &Config) -> CliResult<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);
    let tag_version = TagVersion::from(config.tags);

    match &config.command {
        Commands::Read { files, output } => command_read(files, output.as_deref(), tag_version, &formatter),
        Commands::Set { file, assignments } => command_set(file, assignments, tag_version, &formatter),
        Commands::Clear { file, fields } => command_clear(file, fields, tag_version, &formatter),
        Commands::Detect { files } => command_detect(files, &formatter),
        Commands::Info { files, detailed } => command_info(files, *detailed, &formatter),
    }
}

/// Expand glob patterns, keeping plain paths as given
fn expand_files(patterns: &[String], formatter: &OutputFormatter) -> CliResult<Vec<String>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(pattern.clone());
            continue;
        }

        let entries = glob::glob(pattern)
            .map_err(|e| CliError::InvalidArgument(format!("Invalid glob pattern {}: {}", pattern, e)))?;
        let before = files.len();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path.display().to_string()),
                Ok(_) => {}
                Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
            }
        }
        if files.len() == before {
            formatter.print_info(&format!("No files found matching {}", pattern));
        }
    }
    Ok(files)
}

fn open(file_path: &str, tag_version: TagVersion) -> CliResult<Mp3File> {
    if !Path::new(file_path).exists() {
        return Err(CliError::FileNotFound(file_path.to_string()));
    }
    let mut file = Mp3File::open(file_path)?;
    file.set_version(tag_version);
    Ok(file)
}

/// Read tags from files
fn command_read(
    patterns: &[String],
    output: Option<&str>,
    tag_version: TagVersion,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(BufWriter::new(File::create(path)?))
    } else {
        Box::new(std::io::stdout())
    };

    for file_path in expand_files(patterns, formatter)? {
        match open(&file_path, tag_version) {
            Ok(mut file) => {
                formatter.output_tags(&file_path, &file.get_tags(), &mut *writer)?;
            }
            Err(e) => formatter.print_error(&format!("{}: {}", file_path, e)),
        }
    }

    writer.flush()?;
    Ok(())
}

/// Split `field=value`
fn parse_assignment(assignment: &str) -> CliResult<(Field, &str)> {
    let (name, value) = assignment.split_once('=').ok_or_else(|| {
        CliError::InvalidArgument(format!("Expected FIELD=VALUE, got {}", assignment))
    })?;
    Ok((name.trim().parse()?, value))
}

/// Set fields and save
fn command_set(
    file_path: &str,
    assignments: &[String],
    tag_version: TagVersion,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    // Validate every assignment before touching the file
    let assignments = assignments
        .iter()
        .map(|assignment| parse_assignment(assignment))
        .collect::<CliResult<Vec<_>>>()?;

    let mut file = open(file_path, tag_version)?;
    for (field, value) in assignments {
        file.set_field(field, value)?;
    }
    file.save()?;

    formatter.print_success(&format!("Updated tags for {}", file_path));
    Ok(())
}

/// Clear fields and save
fn command_clear(
    file_path: &str,
    names: &[String],
    tag_version: TagVersion,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    let fields = names
        .iter()
        .map(|name| name.trim().parse::<Field>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut file = open(file_path, tag_version)?;
    for field in fields {
        file.clear_field(field);
    }
    file.save()?;

    formatter.print_success(&format!("Cleared {} field(s) in {}", names.len(), file_path));
    Ok(())
}

/// Detect the ID3 version
fn command_detect(files: &[String], formatter: &OutputFormatter) -> CliResult<()> {
    for file_path in files {
        match open(file_path, TagVersion::Both) {
            Ok(mut file) => {
                let trailer = if file.frames().last().is_some_and(|f| f.offset().is_some()) {
                    ", ID3v1 trailer"
                } else {
                    ""
                };
                formatter.print_info(&format!("{}: ID3 {}{}", file_path, file.id3_version(), trailer));
            }
            Err(e) => formatter.print_error(&format!("{}: Unknown format ({})", file_path, e)),
        }
    }

    Ok(())
}

/// Show detailed file information
fn command_info(files: &[String], detailed: bool, formatter: &OutputFormatter) -> CliResult<()> {
    for file_path in files {
        let path = Path::new(file_path);
        if !path.exists() {
            formatter.print_error(&format!("File not found: {}", file_path));
            continue;
        }

        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified().ok();

        let mut file = match Mp3File::open(path) {
            Ok(file) => file,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, e));
                continue;
            }
        };

        println!("\n📁 {}", file_path);
        println!("{}", "─".repeat(60));
        println!("Size: {} bytes", metadata.len());
        if let Some(mtime) = modified {
            let date: chrono::DateTime<chrono::Utc> = mtime.into();
            println!("Modified: {}", date.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        println!("Version: ID3 {}", file.id3_version());

        if detailed {
            println!("\nFrames:");
            for frame in file.frames() {
                match frame.offset() {
                    Some(offset) => println!("  @{:<8} {}", offset, frame),
                    None => println!("  {:<9} {}", "-", frame),
                }
            }
        }
    }

    Ok(())
}
