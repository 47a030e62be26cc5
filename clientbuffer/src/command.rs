//! Administrative commands.
//!
//! These are the commands a user sends to the module to manage which of
//! their clients are filtered. Each returns the lines of text to show the
//! user.

use crate::{prelude::*, table::Table};
use std::str::FromStr;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

const LAST_SEEN_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum AdminCommand {
    Help,
    AddClient,
    DelClient,
    ListClients,
}

impl AdminCommand {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn arguments(self) -> &'static str {
        match self {
            Self::AddClient | Self::DelClient => "<identifier>",
            Self::Help | Self::ListClients => "",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Help => "Generate this output.",
            Self::AddClient => "Add a client.",
            Self::DelClient => "Delete a client.",
            Self::ListClients => "List known clients.",
        }
    }
}

impl<S: KeyValueStore, C: Clock> SuppressionEngine<S, C> {
    /// Run one administrative command line.
    ///
    /// `current` is the identifier of the connection issuing the command, if
    /// it has one; it is marked in client listings.
    pub fn handle_command(
        &self,
        line: &str,
        current: Option<&str>,
        session: &impl Session,
    ) -> Vec<String> {
        handle_command(self.store(), line, current, session)
    }
}

/// Run one administrative command line against `store`
pub fn handle_command<S: KeyValueStore>(
    store: &ClientStore<S>,
    line: &str,
    current: Option<&str>,
    session: &impl Session,
) -> Vec<String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return help();
    };
    let argument = words.next();

    let Ok(command) = AdminCommand::from_str(name) else {
        return vec![
            format!("Unknown command: {}", name),
            "Use 'Help' for a list of commands.".to_string(),
        ];
    };

    match command {
        AdminCommand::Help => help(),
        AdminCommand::AddClient => add_client(store, argument),
        AdminCommand::DelClient => del_client(store, argument),
        AdminCommand::ListClients => list_clients(store, current, session),
    }
}

fn usage(command: AdminCommand) -> Vec<String> {
    vec![format!("Usage: {} {}", command.name(), command.arguments())]
}

fn help() -> Vec<String> {
    let mut table = Table::new(["Command", "Arguments", "Description"]);
    for command in AdminCommand::iter() {
        table.add_row([command.name(), command.arguments(), command.description()]);
    }
    table.render()
}

fn add_client<S: KeyValueStore>(store: &ClientStore<S>, argument: Option<&str>) -> Vec<String> {
    let Some(identifier) = argument else {
        return usage(AdminCommand::AddClient);
    };
    let Ok(client) = ClientId::from_str(identifier) else {
        return vec![format!("Invalid client identifier: {}", identifier)];
    };

    if store.is_registered(client.as_str()) {
        return vec![format!("Client already exists: {}", client)];
    }
    if !store.register(&client) {
        return vec![format!("Failed to add client: {}", client)];
    }

    tracing::info!("Added client {}", client);
    vec![format!("Client added: {}", client)]
}

fn del_client<S: KeyValueStore>(store: &ClientStore<S>, argument: Option<&str>) -> Vec<String> {
    let Some(identifier) = argument else {
        return usage(AdminCommand::DelClient);
    };
    let client = match ClientId::from_str(identifier) {
        Ok(client) if store.is_registered(client.as_str()) => client,
        _ => return vec![format!("Unknown client: {}", identifier)],
    };

    let outcome = store.deregister(&client);
    if outcome.is_complete() {
        tracing::info!("Removed client {}", client);
        vec![format!("Client removed: {}", client)]
    } else {
        vec![format!(
            "Failed to remove client: {} ({} keys could not be deleted)",
            client, outcome.failed
        )]
    }
}

fn format_last_seen(mark: Watermark) -> String {
    mark.timestamp()
        .and_then(|ts| ts.to_datetime())
        .map(|dt| dt.format(LAST_SEEN_FORMAT).to_string())
        .unwrap_or_default()
}

fn list_clients<S: KeyValueStore>(
    store: &ClientStore<S>,
    current: Option<&str>,
    session: &impl Session,
) -> Vec<String> {
    let clients = store.clients();
    if clients.is_empty() {
        return vec!["No identified clients".to_string()];
    }

    let mut table = Table::new(["Client", "Connected", "Last seen message"]);
    for client in clients {
        let name = if current == Some(client.as_str()) {
            format!("*{}", client)
        } else {
            client.to_string()
        };
        let connected = if session.is_connected(&client) { "yes" } else { "no" };

        table.add_row([name, connected.to_string(), format_last_seen(store.last_seen(&client))]);
    }
    table.render()
}
