use clap::Parser;
use dashres::{output_mode_for, Cli, Config, OutputFormatter, ResourceExtractor, UserFriendlyError};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Validate arguments before touching configuration or the filesystem
    let input = match cli.require_input() {
        Ok(input) => input,
        Err(e) => {
            let formatter = startup_formatter(&cli);
            formatter.print_user_friendly_error(&e);
            if wants_pause(&cli) {
                formatter.wait_for_key();
            }
            return e.exit_code();
        }
    };

    let extractor = match ResourceExtractor::from_cli(&cli) {
        Ok(extractor) => extractor,
        Err(e) => {
            startup_formatter(&cli).print_user_friendly_error(&e);
            return e.exit_code();
        }
    };

    if cli.dry_run {
        return handle_dry_run(&extractor, input);
    }

    let exit_code = match extractor.extract(input) {
        Ok(report) => {
            extractor.output_formatter().print_extraction_report(&report);
            0
        }
        Err(e) => {
            extractor.handle_error(&e);
            e.exit_code()
        }
    };

    extractor.pause_if_requested();
    exit_code
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "dashres.toml".to_string());

    match ResourceExtractor::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  dashres <XAM_FILE> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(extractor: &ResourceExtractor, input: &std::path::Path) -> i32 {
    let formatter = extractor.output_formatter();

    formatter.info("DRY RUN MODE - the extraction tool will not be started");

    match extractor.plan(input) {
        Ok(plan) => {
            formatter.print_plan(&plan);
            if plan.destination.exists() {
                formatter.warning(&format!(
                    "{} exists and would be replaced",
                    plan.destination.display()
                ));
            }
            formatter.success("Dry run completed successfully");
            0
        }
        Err(e) => {
            extractor.handle_error(&e);
            e.exit_code()
        }
    }
}

/// `--pause` or `[output] pause` from the config file. An unreadable config
/// counts as no pause.
fn wants_pause(cli: &Cli) -> bool {
    cli.pause
        || Config::load_with_defaults(cli.config.as_ref())
            .map(|config| config.output.pause)
            .unwrap_or(false)
}

fn startup_formatter(cli: &Cli) -> OutputFormatter {
    OutputFormatter::new(output_mode_for(&cli.output_format), 0, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli::try_parse_from([
            "dashres",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[tool]"));
    }

    #[test]
    fn test_generate_config_into_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing").join("test.toml");

        let cli = Cli::try_parse_from([
            "dashres",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(handle_generate_config(&cli), 1);
    }

    #[test]
    fn test_pause_from_config_without_input() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("pause.toml");
        std::fs::write(&config_path, "[output]\npause = true\n").unwrap();

        let cli = Cli::try_parse_from(["dashres", "--config", config_path.to_str().unwrap()])
            .unwrap();
        assert!(cli.require_input().is_err());
        assert!(wants_pause(&cli));
    }

    #[test]
    fn test_no_pause_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("plain.toml");
        std::fs::write(&config_path, "[tool]\ntimeout = 10\n").unwrap();

        let cli = Cli::try_parse_from(["dashres", "--config", config_path.to_str().unwrap()])
            .unwrap();
        assert!(!wants_pause(&cli));

        let cli = Cli::try_parse_from(["dashres", "--pause"]).unwrap();
        assert!(wants_pause(&cli));
    }
}
