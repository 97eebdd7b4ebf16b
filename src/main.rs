use clap::error::ErrorKind;
use mdmerge::ui::launch::{self, LaunchContext, SystemLaunchContext};
use mdmerge::{
    Cli, MdMerge, MdMergeError, MergeRequest, OutputFormatter, OutputMode, PauseMode,
    UserFriendlyError,
};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let context = SystemLaunchContext::new();

    let cli = match Cli::try_parse_ordered(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => return handle_parse_error(&e, &context),
    };

    init_tracing(cli.verbosity_level());

    if cli.generate_config {
        return handle_generate_config(&cli, &context);
    }

    let inputs = cli.input_paths();
    if inputs.is_empty() {
        return handle_no_input(&cli);
    }

    let mdmerge = match MdMerge::from_cli(&cli) {
        Ok(mdmerge) => mdmerge,
        Err(e) => {
            print_startup_error(&e);
            pause_if_needed(&context, cli.pause.unwrap_or_default(), None);
            return e.exit_code();
        }
    };

    let request = MergeRequest {
        inputs,
        output: cli.output_path(),
        dry_run: cli.dry_run,
    };

    let exit_code = match mdmerge.merge(&request) {
        Ok(report) => {
            mdmerge.output_formatter().print_merge_report(&report);
            0
        }
        Err(e) => {
            tracing::debug!(error = ?e, "merge failed");
            mdmerge.handle_error(&e);
            e.exit_code()
        }
    };

    pause_if_needed(
        &context,
        mdmerge.config().ui.pause,
        Some(mdmerge.output_formatter()),
    );
    exit_code
}

/// Help and version exit with 0, every other argument error with 1 after
/// the usual exit pause.
fn handle_parse_error(error: &clap::Error, context: &dyn LaunchContext) -> i32 {
    let _ = error.print();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => {
            pause_if_needed(context, PauseMode::Auto, None);
            1
        }
    }
}

fn handle_generate_config(cli: &Cli, context: &dyn LaunchContext) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "mdmerge.toml".to_string());

    match MdMerge::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  mdmerge <inputs...> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            pause_if_needed(context, cli.pause.unwrap_or_default(), None);
            1
        }
    }
}

/// Usage for a bare launch. When started interactively (e.g. double-click)
/// the window stays open until Enter is pressed.
fn handle_no_input(cli: &Cli) -> i32 {
    let formatter = OutputFormatter::new(cli.output_mode(), 0, false);
    formatter.print_usage(&Cli::usage_text());

    if !launch::is_input_redirected() {
        formatter.print_pause_prompt();
        launch::wait_for_enter();
    }

    MdMergeError::NoInput.exit_code()
}

fn pause_if_needed(
    context: &dyn LaunchContext,
    mode: PauseMode,
    formatter: Option<&OutputFormatter>,
) {
    if launch::should_pause(context, mode) {
        match formatter {
            Some(formatter) => formatter.print_pause_prompt(),
            None => println!("\nPress Enter to exit."),
        }
        launch::wait_for_enter();
    }
}

fn print_startup_error(error: &MdMergeError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

/// Logs go to stderr, only when asked for with `-v` or `RUST_LOG`.
fn init_tracing(verbosity: u8) {
    let directive = match verbosity {
        0 => match std::env::var("RUST_LOG") {
            Ok(_) => None,
            Err(_) => return,
        },
        1 => Some("mdmerge=info"),
        2 => Some("mdmerge=debug"),
        _ => Some("mdmerge=trace"),
    };

    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::from_default_env(),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
