use crate::agent::Agent;
use crate::format::{error_line, help_lines, history_lines, stats_lines, system_line, CYAN, DIM, RESET, WHITE_BOLD};

const DEFAULT_HISTORY_LINES: usize = 10;

/// Handle a `/command` typed at the prompt (without the leading slash).
pub(crate) fn handle_slash_command(agent: &mut Agent, input: &str) -> Vec<String> {
    let mut parts = input.trim().splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    match command.as_str() {
        "contacts" => handle_contacts_command(agent, arg),
        "contact" => handle_contact_command(agent, arg),
        "history" => handle_history_command(agent, arg),
        "stats" => match agent.history().stats(agent.user_id()) {
            Ok(stats) => stats_lines(&stats),
            Err(e) => vec![error_line(&e.to_string())],
        },
        "help" => help_lines(),
        other => vec![error_line(&format!("Unknown command: /{other}"))],
    }
}

fn handle_contacts_command(agent: &Agent, query: Option<&str>) -> Vec<String> {
    let user_id = agent.user_id();
    let contacts = match query {
        Some(q) => agent.contacts().search(user_id, q),
        None => agent.contacts().list(user_id),
    };
    if contacts.is_empty() {
        return vec![system_line("No contacts. Add one with /contact add <name> <email>")];
    }
    let mut output = vec![format!("{WHITE_BOLD}Contacts:{RESET}")];
    for c in contacts {
        output.push(format!("  {CYAN}{}{RESET} {DIM}<{}>{RESET}", c.name, c.email));
    }
    output
}

fn handle_contact_command(agent: &mut Agent, arg: Option<&str>) -> Vec<String> {
    let usage = || vec![error_line("Usage: /contact add <name> <email> | /contact rm <name>")];
    let Some(arg) = arg else {
        return usage();
    };
    let mut parts = arg.splitn(2, char::is_whitespace);
    let sub = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).unwrap_or_default();
    let user_id = agent.user_id().to_string();

    match sub {
        "add" => {
            // The email is the last word; everything before it is the name.
            let Some((name, email)) = rest.rsplit_once(char::is_whitespace) else {
                return usage();
            };
            match agent.contacts_mut().add(&user_id, name, email) {
                Ok(c) => vec![system_line(&format!("Added {} <{}>", c.name, c.email))],
                Err(e) => vec![error_line(&e.to_string())],
            }
        }
        "rm" | "remove" if !rest.is_empty() => match agent.contacts_mut().remove(&user_id, rest) {
            Ok(c) => vec![system_line(&format!("Removed {}", c.name))],
            Err(e) => vec![error_line(&e.to_string())],
        },
        _ => usage(),
    }
}

fn handle_history_command(agent: &Agent, arg: Option<&str>) -> Vec<String> {
    let user_id = agent.user_id();
    let result = match arg {
        None => agent.history().recent(user_id, DEFAULT_HISTORY_LINES),
        Some(n) => match n.parse::<usize>() {
            Ok(n) => agent.history().recent(user_id, n),
            Err(_) => agent.history().search(user_id, n),
        },
    };
    match result {
        Ok(entries) => history_lines(&entries),
        Err(e) => vec![error_line(&e.to_string())],
    }
}
