use std::{env, env::VarError};

use market_engine::db_types::UserId;

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Serve,
    Watch(UserId),
    Exit,
}

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> Command {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let command = parse_args(&args);
    if command == Command::Exit {
        display_readme();
        display_envs();
    }
    command
}

fn parse_args(args: &[String]) -> Command {
    match args {
        [] => Command::Serve,
        [cmd, user] if cmd == "watch" && !user.trim().is_empty() => Command::Watch(UserId::from(user.trim())),
        _ => Command::Exit,
    }
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "MKT_HOST",
        "MKT_PORT",
        "MKT_DATABASE_URL",
        "MKT_DB_MAX_CONNECTIONS",
        "MKT_MATCH_THRESHOLD",
        "MKT_CANDIDATE_POOL_SIZE",
        "MKT_OWN_LISTING_PAGE",
        "MKT_MAX_MATCHES_PER_LISTING",
        "MKT_FEED_POLL_INTERVAL_MS",
        "MKT_AUTO_SCAN",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
