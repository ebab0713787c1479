// Copyright (c) 2026 rezky_nightky

mod app;
mod cache;
mod cell;
mod column;
mod config;
mod error;
mod font;
mod frame;
mod geometry;
mod grid;
mod pacer;
mod palette;
mod rain;
mod render;
mod runtime;
mod terminal;

use std::env;
use std::fs::OpenOptions;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

use crate::config::{Args, Settings, DEFAULT_PARAMS_USAGE};
use crate::error::AppError;
use crate::font::print_list_faces;
use crate::palette::{color_mode_from_flag, color_mode_label, detect_color_mode_auto};
use crate::terminal::restore_terminal_best_effort;

const HELP_TEMPLATE: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("GLYPHRAIN_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

// stderr shares the screen with the rain, so it stays quiet unless asked.
fn default_log_level(to_file: bool) -> &'static str {
    if to_file {
        "info"
    } else {
        "off"
    }
}

fn init_tracing(args: &Args) {
    if let Some(path) = &args.log_file {
        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("failed to open log file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_log_level(true)));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_log_level(false)));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn install_quit_handlers(quit: &Arc<AtomicBool>) {
    #[cfg(unix)]
    {
        for sig in [SIGINT, SIGTERM, SIGHUP] {
            if let Err(e) = signal_hook::flag::register(sig, Arc::clone(quit)) {
                tracing::warn!(sig, error = %e, "failed to install signal handler");
            }
        }
    }

    #[cfg(windows)]
    {
        let quit = Arc::clone(quit);
        if let Err(e) = ctrlc::set_handler(move || {
            quit.store(true, std::sync::atomic::Ordering::Relaxed);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn fail(e: AppError) -> ! {
    tracing::error!(error = %e, "glyphrain stopped");
    eprintln!("{}", e);
    std::process::exit(1);
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(DEFAULT_PARAMS_USAGE);
    cmd = cmd.help_template(HELP_TEMPLATE);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_fonts {
        print_list_faces();
        return;
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto));
        let effective = match args.colormode.map(color_mode_from_flag) {
            Some(Ok(m)) => {
                println!("  forced: {}", color_mode_label(m));
                m
            }
            Some(Err(e)) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            None => auto,
        };
        println!("  effective: {}", color_mode_label(effective));
        return;
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return;
    }

    if args.info {
        let sha = env!("GLYPHRAIN_GIT_SHA");
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        if sha.is_empty() {
            println!("Build: {}", build_info());
        } else {
            println!("Build: {} ({})", build_info(), sha);
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return;
    }

    init_tracing(&args);

    let settings = Settings::from_args(&args).unwrap_or_else(|e| fail(e.into()));
    tracing::info!(?settings, "starting");

    let quit = Arc::new(AtomicBool::new(false));
    install_quit_handlers(&quit);

    match app::run(&settings, quit) {
        Ok(Some(stats)) => stats.print(),
        Ok(None) => {}
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn stderr_logging_is_off_unless_asked() {
        assert_eq!(default_log_level(false), "off");
        assert_eq!(default_log_level(true), "info");
    }

    #[test]
    fn log_file_help_warns_about_stderr() {
        let cmd = Args::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id().as_str() == "log_file")
            .unwrap();
        let help = arg.get_help().unwrap().to_string();
        assert!(help.contains("RUST_LOG"));
        assert!(help.contains("stderr"));
    }
}
