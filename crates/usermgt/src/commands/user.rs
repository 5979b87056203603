use super::status_colored;
use crate::UserCommands;
use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use usermgt_cloud::{GlobalState, ManagedResource, ResourceState, StateManager};
use usermgt_fastly::{FastlyProvider, Role, USER_RESOURCE_TYPE};

pub async fn handle(
    provider: &FastlyProvider,
    dir: &Path,
    command: UserCommands,
) -> anyhow::Result<()> {
    let manager = StateManager::new(dir);
    let lock = manager.acquire_lock(&operation(&command)).await?;
    let mut state = manager.load().await?;
    tracing::debug!(
        "Loaded {} resources from {}",
        state.resources.len(),
        dir.display()
    );
    let resource = provider.user_resource();

    match command {
        UserCommands::Create {
            resource: name,
            login,
            name: display_name,
            role,
        } => {
            let key = GlobalState::key(USER_RESOURCE_TYPE, &name);
            if state.get_resource(&key).is_some_and(|r| !r.is_gone()) {
                anyhow::bail!("{} is already managed; use `usermgt user read {}`", key, name);
            }
            role.parse::<Role>()?;

            let mut data = ResourceState::new(USER_RESOURCE_TYPE)
                .with_attribute("login", json!(login))
                .with_attribute("name", json!(display_name))
                .with_attribute("role", json!(role));
            resource
                .create(&mut data)
                .await
                .with_context(|| format!("failed to create {}", key))?;

            print_resource(&key, &data);
            state.set_resource(key, data);
        }
        UserCommands::Read { resource: name } => {
            let key = GlobalState::key(USER_RESOURCE_TYPE, &name);
            let mut data = existing(&state, &key)?.clone();
            resource
                .read(&mut data)
                .await
                .with_context(|| format!("failed to read {}", key))?;

            if data.is_gone() {
                println!(
                    "{} {} no longer exists remotely; run `usermgt user create` to invite again",
                    "!".yellow(),
                    key
                );
                state.remove_resource(&key);
            } else {
                print_resource(&key, &data);
                state.set_resource(key, data);
            }
        }
        UserCommands::Update {
            resource: name,
            name: display_name,
            role,
        } => {
            let key = GlobalState::key(USER_RESOURCE_TYPE, &name);
            let prior = existing(&state, &key)?.clone();
            let mut planned = prior.clone();
            if let Some(display_name) = display_name {
                planned.set_attribute("name", json!(display_name));
            }
            if let Some(role) = role {
                role.parse::<Role>()?;
                planned.set_attribute("role", json!(role));
            }

            resource
                .update(&prior, &mut planned)
                .await
                .with_context(|| format!("failed to update {}", key))?;

            print_resource(&key, &planned);
            state.set_resource(key, planned);
        }
        UserCommands::Delete { resource: name } => {
            let key = GlobalState::key(USER_RESOURCE_TYPE, &name);
            let data = existing(&state, &key)?;
            resource
                .delete(data)
                .await
                .with_context(|| format!("failed to delete {}", key))?;

            println!("{} Deleted {}", "✓".green(), key);
            state.remove_resource(&key);
        }
        UserCommands::Import { resource: name, id } => {
            let key = GlobalState::key(USER_RESOURCE_TYPE, &name);
            if state.get_resource(&key).is_some() {
                anyhow::bail!("{} is already managed", key);
            }
            let data = resource
                .import(&id)
                .await
                .with_context(|| format!("failed to import {}", id))?;

            print_resource(&key, &data);
            state.set_resource(key, data);
        }
        UserCommands::List => {}
    }

    manager.save(&state).await?;
    lock.release().await?;
    Ok(())
}

/// Print managed users from local state without contacting the API
pub async fn handle_list(dir: &Path) -> anyhow::Result<()> {
    let state = StateManager::new(dir).load().await?;
    let users = state.resources_of_type(USER_RESOURCE_TYPE);
    if users.is_empty() {
        println!("{}", "No managed users".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:<32} {:<32} {:<10} {:<8} {:<24}",
            "RESOURCE", "LOGIN", "ROLE", "STATUS", "ID"
        )
        .bold()
    );
    println!("{}", "─".repeat(110).dimmed());
    for (key, data) in users {
        println!(
            "{:<32} {:<32} {:<10} {:<8} {:<24}",
            key,
            data.get_str("login"),
            data.get_str("role"),
            status_colored(data.status),
            data.id
        );
    }
    Ok(())
}

/// Label recorded in the state lock, e.g. `user create alice`
fn operation(command: &UserCommands) -> String {
    let (verb, resource) = match command {
        UserCommands::Create { resource, .. } => ("create", resource.as_str()),
        UserCommands::Read { resource } => ("read", resource.as_str()),
        UserCommands::Update { resource, .. } => ("update", resource.as_str()),
        UserCommands::Delete { resource } => ("delete", resource.as_str()),
        UserCommands::Import { resource, .. } => ("import", resource.as_str()),
        UserCommands::List => ("list", ""),
    };
    format!("user {} {}", verb, resource).trim_end().to_string()
}

fn existing<'a>(state: &'a GlobalState, key: &str) -> anyhow::Result<&'a ResourceState> {
    state
        .get_resource(key)
        .with_context(|| format!("{} is not managed; create or import it first", key))
}

fn print_resource(key: &str, data: &ResourceState) {
    println!("{} {}", key.bold(), status_colored(data.status));
    println!("  login:         {}", data.get_str("login"));
    println!("  name:          {}", data.get_str("name"));
    println!("  role:          {}", data.get_str("role"));
    println!("  invitation_id: {}", data.get_str("invitation_id"));
    println!("  user_id:       {}", data.get_str("user_id"));
}
