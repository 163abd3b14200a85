//! Output formatting and display utilities.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Color, ContentArrangement, Table, TableComponent};

use crate::config::Settings;
use crate::error::Result;
use crate::model::{Protocol, SocketRecord};

/// Printed instead of a table when discovery finds nothing.
pub const NO_SOCKETS_HINT: &str = "No listening sockets found (or insufficient permissions). \
Try --sudo or start a test server, e.g. python3 -m http.server 8000";

const MISSING: &str = "---";

/// Creates a table with clean styling: solid borders, no row separators.
fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_style(TableComponent::VerticalLines, '│');
    table.set_style(TableComponent::MiddleHeaderIntersections, '┼');
    table.set_style(TableComponent::HeaderLines, '─');
    table.set_style(TableComponent::LeftHeaderIntersection, '├');
    table.set_style(TableComponent::RightHeaderIntersection, '┤');
    table
}

/// Builds the socket table.
pub fn build_socket_table(sockets: &[SocketRecord]) -> Table {
    let mut table = create_table();
    table.set_header(vec![
        "ADDRESS", "PORT", "PID", "PROCESS", "USER", "PROTO", "FAMILY",
    ]);

    for socket in sockets {
        let proto_cell = match socket.protocol {
            Protocol::Tcp => Cell::new(socket.protocol).fg(Color::Green),
            Protocol::Udp => Cell::new(socket.protocol).fg(Color::Cyan),
        };

        table.add_row(vec![
            Cell::new(&socket.address),
            Cell::new(socket.port),
            Cell::new(or_missing(socket.owner_pid.map(|p| p.to_string()))),
            Cell::new(or_missing(socket.process_name.clone())),
            Cell::new(or_missing(socket.user.clone())),
            proto_cell,
            Cell::new(socket.address_family),
        ]);
    }

    table
}

fn or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING.to_string())
}

/// Displays discovered sockets as a table.
pub fn display_sockets(sockets: &[SocketRecord]) {
    if sockets.is_empty() {
        println!("{NO_SOCKETS_HINT}");
        return;
    }
    println!("{}", build_socket_table(sockets));
}

/// Displays discovered sockets as JSON.
pub fn display_sockets_json(sockets: &[SocketRecord]) -> Result<()> {
    if sockets.is_empty() {
        eprintln!("{NO_SOCKETS_HINT}");
    }
    println!("{}", serde_json::to_string_pretty(sockets)?);
    Ok(())
}

/// Displays the effective settings.
pub fn display_config(settings: &Settings, path: Option<&std::path::Path>) {
    if let Some(p) = path {
        println!("Config file: {}", p.display());
        println!();
    }

    let mut table = create_table();
    table.set_header(vec!["SETTING", "VALUE"]);
    table.add_row(vec![Cell::new("elevate"), Cell::new(settings.elevate)]);
    table.add_row(vec![
        Cell::new("elevation_command"),
        Cell::new(settings.elevation_command.join(" ")),
    ]);
    table.add_row(vec![Cell::new("json"), Cell::new(settings.json)]);
    table.add_row(vec![
        Cell::new("tail.interval"),
        Cell::new(format!("{}s", settings.tail.interval)),
    ]);

    println!("{table}");
}

/// Configuration info for JSON output.
#[derive(Debug, serde::Serialize)]
struct ConfigInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    #[serde(flatten)]
    settings: &'a Settings,
}

/// Displays the effective settings as JSON.
pub fn display_config_json(settings: &Settings, path: Option<&std::path::Path>) -> Result<()> {
    let info = ConfigInfo {
        config_file: path.map(|p| p.display().to_string()),
        settings,
    };
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
