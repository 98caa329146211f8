use std::{env, env::VarError};

/// The server has no real CLI. Any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Merchant keys are left out on purpose
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "ZMP_HOST",
        "ZMP_PORT",
        "ZMP_DATABASE_URL",
        "ZMP_RECONCILIATION_DELAY_SECS",
        "ZMP_ZALO_API_URL",
        "ZMP_ZALO_APP_ID",
        "ZMP_ZALO_TIMEOUT_SECS",
        "ZMP_NOTIFY_MAC_KEY",
        "ZMP_ORDER_CALLBACK_MAC_KEY",
        "ZMP_CHECKOUT_MAC_KEY",
        "ZMP_STATUS_MAC_KEY",
        "ZMP_SETTLEMENT_MAC_KEY",
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
