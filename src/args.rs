//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. Commands are positional
//! (`adhanr status`), options may appear anywhere.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Drive the display (default when no command is given)
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool, // Emit DisplayEvent JSON lines on stdout
    },
    /// Print the current mode and countdowns, then exit
    Status {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
    },
    /// Print the remaining mode transitions of today, then exit
    Next {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
    },
    /// Run the scheduler against a simulated clock
    Simulate {
        debug_enabled: bool,
        start_time: String,
        end_time: String,
        multiplier: f64, // 0.0 = fast-forward
        log_to_file: bool,
        config_dir: Option<String>,
        json: bool,
    },
    /// Detailed help, optionally for one command
    Help { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Default acceleration for `simulate` without a multiplier: one hour per second.
pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 3600.0;

/// Options that apply to every command.
#[derive(Default)]
struct GlobalOptions {
    debug_enabled: bool,
    json: bool,
    config_dir: Option<String>,
    help: bool,
    version: bool,
    fast_forward: bool,
    log_to_file: bool,
    error: bool,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut options = GlobalOptions::default();
        let mut positional: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args_vec.len() {
            let arg = &args_vec[i];
            match arg.as_str() {
                "--help" | "-h" => options.help = true,
                "--version" | "-V" | "-v" => options.version = true,
                "--debug" | "-d" => options.debug_enabled = true,
                "--json" | "-j" => options.json = true,
                "--fast-forward" => options.fast_forward = true,
                "--log" => options.log_to_file = true,
                "--config" | "-c" => {
                    // Parse: --config <directory>
                    if i + 1 < args_vec.len() && !args_vec[i + 1].starts_with('-') {
                        options.config_dir = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        options.error = true;
                    }
                }
                _ if arg.starts_with('-') && arg.parse::<f64>().is_err() => {
                    log_warning!("Unknown option: {arg}");
                    options.error = true;
                }
                _ => positional.push(arg.clone()),
            }
            i += 1;
        }

        // Version and help take precedence over everything else
        if options.version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if options.error {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }
        if options.help && positional.is_empty() {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let action = match positional.first().map(String::as_str) {
            None | Some("run") => {
                if positional.len() > 1 {
                    unexpected_arguments("run", &positional[1..])
                } else {
                    CliAction::Run {
                        debug_enabled: options.debug_enabled,
                        config_dir: options.config_dir,
                        json: options.json,
                    }
                }
            }
            Some(_) if options.help => CliAction::Help {
                command: positional.first().cloned(),
            },
            Some("status") | Some("s") => {
                if positional.len() > 1 {
                    unexpected_arguments("status", &positional[1..])
                } else {
                    CliAction::Status {
                        debug_enabled: options.debug_enabled,
                        config_dir: options.config_dir,
                        json: options.json,
                    }
                }
            }
            Some("next") | Some("n") => {
                if positional.len() > 1 {
                    unexpected_arguments("next", &positional[1..])
                } else {
                    CliAction::Next {
                        debug_enabled: options.debug_enabled,
                        config_dir: options.config_dir,
                        json: options.json,
                    }
                }
            }
            Some("simulate") | Some("S") => parse_simulate(&positional[1..], options),
            Some("help") | Some("h") => CliAction::Help {
                command: positional.get(1).cloned(),
            },
            Some(command) => {
                log_warning!("Unknown command: {}", command);
                CliAction::ShowHelpDueToError
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

fn unexpected_arguments(command: &str, extra: &[String]) -> CliAction {
    log_warning!(
        "'{}' takes no arguments, got: {}",
        command,
        extra.join(" ")
    );
    CliAction::ShowHelpDueToError
}

/// Parse: simulate "<start>" "<end>" [multiplier | --fast-forward] [--log]
fn parse_simulate(args: &[String], options: GlobalOptions) -> CliAction {
    let (start_time, end_time) = match args {
        [start, end, ..] => (start.clone(), end.clone()),
        _ => {
            log_warning!(
                "Missing arguments for simulate. Usage: adhanr simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" [multiplier | --fast-forward] [--log]"
            );
            return CliAction::ShowHelpDueToError;
        }
    };

    // Basic shape check; the simulate command does the real parsing
    let looks_like_datetime = |s: &str| {
        s.len() == 19
            && s.chars().nth(4) == Some('-')
            && s.chars().nth(7) == Some('-')
            && s.chars().nth(10) == Some(' ')
            && s.chars().nth(13) == Some(':')
            && s.chars().nth(16) == Some(':')
    };
    for (label, value) in [("start", &start_time), ("end", &end_time)] {
        if !looks_like_datetime(value) {
            log_error!(
                "Invalid {} time format: '{}'. Use YYYY-MM-DD HH:MM:SS",
                label,
                value
            );
            return CliAction::ShowHelpDueToError;
        }
    }

    let multiplier = match &args[2..] {
        [] if options.fast_forward => 0.0,
        [] => DEFAULT_SIMULATION_MULTIPLIER,
        [value] if !options.fast_forward => match value.parse::<f64>() {
            Ok(mult) if (0.1..=3600.0).contains(&mult) => mult,
            Ok(mult) => {
                log_error!("Invalid multiplier: {}. Must be between 0.1 and 3600.", mult);
                return CliAction::ShowHelpDueToError;
            }
            Err(_) => {
                log_error!("Invalid multiplier: '{}'", value);
                return CliAction::ShowHelpDueToError;
            }
        },
        _ => {
            log_warning!("Too many arguments for simulate");
            return CliAction::ShowHelpDueToError;
        }
    };

    CliAction::Simulate {
        debug_enabled: options.debug_enabled,
        start_time,
        end_time,
        multiplier,
        log_to_file: options.log_to_file,
        config_dir: options.config_dir,
        json: options.json,
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("adhanr [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-j, --json             Machine-readable output (JSON lines while running)");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Drive the display (default)");
    log_indented!("status, s              Show the current mode and countdowns");
    log_indented!("next, n                List today's remaining mode changes");
    log_indented!("simulate, S <start> <end> [multiplier | --fast-forward] [--log]");
    log_indented!("                       Replay a time range with an accelerated clock");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        let mut full = vec!["adhanr"];
        full.extend_from_slice(args);
        ParsedArgs::parse(full).action
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(
            parse(&[]),
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
                json: false,
            }
        );
    }

    #[test]
    fn test_parse_run_with_flags() {
        assert_eq!(
            parse(&["run", "--debug", "--config", "/etc/adhanr", "--json"]),
            CliAction::Run {
                debug_enabled: true,
                config_dir: Some("/etc/adhanr".to_string()),
                json: true,
            }
        );
    }

    #[test]
    fn test_parse_debug_short_flag() {
        assert_eq!(
            parse(&["-d"]),
            CliAction::Run {
                debug_enabled: true,
                config_dir: None,
                json: false,
            }
        );
    }

    #[test]
    fn test_parse_help_flag() {
        assert_eq!(parse(&["--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["-h"]), CliAction::ShowHelp);
    }

    #[test]
    fn test_parse_version_flags() {
        assert_eq!(parse(&["--version"]), CliAction::ShowVersion);
        assert_eq!(parse(&["-V"]), CliAction::ShowVersion);
        assert_eq!(parse(&["-v"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_version_takes_precedence() {
        assert_eq!(parse(&["--help", "--version"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_status_json() {
        assert_eq!(
            parse(&["status", "--json"]),
            CliAction::Status {
                debug_enabled: false,
                config_dir: None,
                json: true,
            }
        );
        assert_eq!(
            parse(&["--json", "s"]),
            CliAction::Status {
                debug_enabled: false,
                config_dir: None,
                json: true,
            }
        );
    }

    #[test]
    fn test_parse_next() {
        assert_eq!(
            parse(&["next"]),
            CliAction::Next {
                debug_enabled: false,
                config_dir: None,
                json: false,
            }
        );
    }

    #[test]
    fn test_parse_simulate_default_multiplier() {
        assert_eq!(
            parse(&["simulate", "2026-10-18 04:00:00", "2026-10-18 22:00:00"]),
            CliAction::Simulate {
                debug_enabled: false,
                start_time: "2026-10-18 04:00:00".to_string(),
                end_time: "2026-10-18 22:00:00".to_string(),
                multiplier: DEFAULT_SIMULATION_MULTIPLIER,
                log_to_file: false,
                config_dir: None,
                json: false,
            }
        );
    }

    #[test]
    fn test_parse_simulate_fast_forward_with_log() {
        match parse(&[
            "simulate",
            "2026-10-18 04:00:00",
            "2026-10-18 22:00:00",
            "--fast-forward",
            "--log",
        ]) {
            CliAction::Simulate {
                multiplier,
                log_to_file,
                ..
            } => {
                assert_eq!(multiplier, 0.0);
                assert!(log_to_file);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_simulate_multiplier() {
        match parse(&["S", "2026-10-18 04:00:00", "2026-10-18 05:00:00", "60"]) {
            CliAction::Simulate { multiplier, .. } => assert_eq!(multiplier, 60.0),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_parse_simulate_errors() {
        assert_eq!(parse(&["simulate"]), CliAction::ShowHelpDueToError);
        assert_eq!(
            parse(&["simulate", "04:00", "2026-10-18 05:00:00"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(&["simulate", "2026-10-18 04:00:00", "2026-10-18 05:00:00", "9000"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_help_command() {
        assert_eq!(
            parse(&["help", "simulate"]),
            CliAction::Help {
                command: Some("simulate".to_string()),
            }
        );
        assert_eq!(
            parse(&["status", "--help"]),
            CliAction::Help {
                command: Some("status".to_string()),
            }
        );
        assert_eq!(parse(&["help"]), CliAction::Help { command: None });
    }

    #[test]
    fn test_parse_unknown_input() {
        assert_eq!(parse(&["--bogus"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["preset", "night"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["status", "extra"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["--config"]), CliAction::ShowHelpDueToError);
    }
}
