//! Command-line front end.
//!
//! Each invocation loads state from the file store, runs one operation
//! through the service layer, and prints the result.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use crate::agent::client::HttpAgentClient;
use crate::agent::{AgentInvoker, AgentResult, AgentRouting, ReplayAgent};
use crate::config::{config_path, create_or_update_config, load_config, AppConfig};
use crate::draft::DraftBuffer;
use crate::error::PulseError;
use crate::normalizer::{next_update_id, now_timestamp};
use crate::notification::clean_channel;
use crate::sample::sample_payload;
use crate::services::dashboard::{get_dashboard, search_history, DashboardResult};
use crate::services::{actions, updates};
use crate::settings::ReminderFrequency;
use crate::state::AppState;
use crate::status::PROGRESS_ROTATION_SECS;
use crate::store::FileStore;
use crate::tone::{priority_tone, severity_tone, status_tone};
use crate::types::{ActionItem, Outcome, Update};
use crate::util::{format_date, format_timestamp};

#[derive(Debug, Parser)]
#[command(
    name = "productpulse",
    version,
    about = "Roadmap updates for your project. Generate, review, and send them to your team."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Answer agent calls locally with canned replies
    #[arg(long, global = true)]
    pub offline: bool,

    /// Show the built-in sample update while history is empty
    #[arg(long, global = true)]
    pub sample: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new roadmap update
    Generate,
    /// Send an update to a Slack channel (defaults to the most recent one)
    Send {
        /// Channel to send to; defaults to the configured default channel
        #[arg(short, long)]
        channel: Option<String>,
        /// Note prepended to the message
        #[arg(short, long)]
        note: Option<String>,
        /// Update to send
        #[arg(long)]
        id: Option<String>,
    },
    /// Dashboard stats for the most recent update
    Stats,
    /// List stored updates, most recent first
    History {
        /// Case-insensitive filter on project name, summary, or id
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Show one update in full
    Show { id: String },
    /// Edit an update's action items and save them
    Actions {
        id: String,
        /// Append an item with this task text
        #[arg(long)]
        add: Vec<String>,
        /// Remove the item at this position (1-based)
        #[arg(long)]
        remove: Vec<usize>,
        /// Mark the item at this position (1-based) as done
        #[arg(long)]
        done: Vec<usize>,
    },
    /// Show or change settings
    Settings {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        channel: Option<String>,
        /// daily, weekly, or bi-weekly
        #[arg(long)]
        frequency: Option<String>,
    },
    /// Show or change the agent endpoint configuration
    Config {
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Delete all stored updates
    Clear,
}

/// Run the parsed command. `Ok(false)` means the operation reported a failure.
pub async fn execute(cli: Cli) -> Result<bool, PulseError> {
    let path = config_path();
    let config = load_config(&path)?;
    let store = FileStore::open(config.data_dir.clone())?;
    let routing = AgentRouting {
        generation: config.generation_agent_id.clone(),
        delivery: config.delivery_agent_id.clone(),
    };
    let state = AppState::new(Arc::new(store), routing);
    state.set_show_sample(cli.sample);

    match cli.command {
        Commands::Generate => {
            let agent: Box<dyn AgentInvoker> = if cli.offline {
                offline_generation_agent()
            } else {
                http_agent(&config)
            };
            let outcome = run_with_progress(&state, agent.as_ref()).await;
            if let Some(update) = state.reviewed_update().filter(|_| outcome.is_success()) {
                print_update(&update, None);
            }
            Ok(report(&outcome))
        }
        Commands::Send { channel, note, id } => {
            if let Some(id) = id.as_deref() {
                updates::view_update(&state, id)?;
            } else if let Some(latest) = state.display_updates().first() {
                let latest_id = latest.id.clone();
                updates::view_update(&state, &latest_id)?;
            }
            if let Some(channel) = channel {
                state.set_channel(&channel);
            }
            let channel = state.channel();
            let agent: Box<dyn AgentInvoker> = if cli.offline {
                offline_delivery_agent(&channel, state.reviewed_update().as_ref())
            } else {
                http_agent(&config)
            };
            let outcome =
                updates::send_delivery(&state, agent.as_ref(), &channel, note.as_deref()).await;
            Ok(report(&outcome))
        }
        Commands::Stats => {
            match get_dashboard(&state, Utc::now()) {
                DashboardResult::Success { stats, latest } => {
                    println!("{} ({})", latest.project_name, format_timestamp(&latest.generated_at));
                    println!("  Completion      {}%", stats.completion);
                    println!("  Features        {}", stats.features_count);
                    println!("  In progress     {}", stats.in_progress);
                    println!("  Risks           {}", stats.risks_count);
                    println!("  Overdue items   {}", stats.overdue_items);
                }
                DashboardResult::Empty { message } => println!("{}", message),
            }
            Ok(true)
        }
        Commands::History { query } => {
            let rows = search_history(&state, &query);
            if rows.is_empty() {
                println!("No updates found.");
            }
            for update in rows {
                let counts = update.counts();
                println!(
                    "{}  {}  {}  {}% [{}]  {} features, {} risks, {} action items{}",
                    update.id,
                    format_date(&update.generated_at),
                    update.project_name,
                    update.summary.completion_percentage,
                    update.summary.status,
                    counts.features,
                    counts.risk_indicators,
                    counts.action_items,
                    update
                        .delivery_status
                        .as_deref()
                        .map(|s| format!("  ({})", s))
                        .unwrap_or_default()
                );
            }
            Ok(true)
        }
        Commands::Show { id } => {
            let update = updates::view_update(&state, &id)?;
            print_update(&update, Some(&state.draft()));
            Ok(true)
        }
        Commands::Actions {
            id,
            add,
            mut remove,
            done,
        } => {
            updates::view_update(&state, &id)?;
            for task in add {
                actions::add_action_item(
                    &state,
                    ActionItem {
                        task,
                        ..ActionItem::default()
                    },
                );
            }
            for position in done {
                actions::toggle_action_item(&state, item_index(position)?);
            }
            // Highest position first so earlier removals don't shift later ones.
            remove.sort_unstable_by(|a, b| b.cmp(a));
            remove.dedup();
            for position in remove {
                actions::remove_action_item(&state, item_index(position)?)?;
            }
            let draft = state.draft();
            print_action_items(draft.items(), Some(&draft));
            Ok(report(&actions::save_draft(&state)))
        }
        Commands::Settings {
            project,
            channel,
            frequency,
        } => {
            let frequency = match frequency.as_deref() {
                Some(raw) => Some(ReminderFrequency::parse(raw).ok_or_else(|| {
                    PulseError::Precondition(format!("Unknown reminder frequency: {}", raw))
                })?),
                None => None,
            };
            let settings = if project.is_some() || channel.is_some() || frequency.is_some() {
                state.update_settings(|s| {
                    if let Some(project) = project {
                        s.project_name = project;
                    }
                    if let Some(channel) = channel {
                        s.default_channel = channel;
                    }
                    if let Some(frequency) = frequency {
                        s.reminder_frequency = frequency;
                    }
                })
            } else {
                state.settings()
            };
            println!("Project            {}", settings.project_name);
            println!("Default channel    {}", display_or_dash(&settings.default_channel));
            println!("Reminders          {}", settings.reminder_frequency.as_str());
            Ok(true)
        }
        Commands::Config { endpoint, api_key } => {
            let config = if endpoint.is_some() || api_key.is_some() {
                create_or_update_config(&path, |c| {
                    if let Some(endpoint) = endpoint {
                        c.agent_endpoint = endpoint;
                    }
                    if let Some(key) = api_key {
                        c.api_key = Some(key).filter(|k| !k.trim().is_empty());
                    }
                })?
            } else {
                config
            };
            println!("Config             {}", path.display());
            println!("Data directory     {}", config.data_dir.display());
            println!("Agent endpoint     {}", config.agent_endpoint);
            println!(
                "API key            {}",
                if config.api_key.is_some() { "set" } else { "not set" }
            );
            Ok(true)
        }
        Commands::Clear => Ok(report(&updates::clear_history(&state))),
    }
}

fn http_agent(config: &AppConfig) -> Box<dyn AgentInvoker> {
    Box::new(HttpAgentClient::new(
        &config.agent_endpoint,
        config.api_key.as_deref(),
    ))
}

/// Offline generation replies with the sample under a fresh identity.
fn offline_generation_agent() -> Box<dyn AgentInvoker> {
    let mut payload = sample_payload();
    if let Value::Object(record) = &mut payload {
        record.insert("update_id".to_string(), Value::String(next_update_id()));
        record.insert("generated_at".to_string(), Value::String(now_timestamp()));
    }
    let agent = ReplayAgent::new();
    agent.push(Ok(AgentResult::ok(payload)));
    Box::new(agent)
}

fn offline_delivery_agent(channel: &str, update: Option<&Update>) -> Box<dyn AgentInvoker> {
    let channel = clean_channel(channel);
    let preview = update
        .map(|u| u.summary.narrative_text.chars().take(80).collect::<String>())
        .unwrap_or_default();
    let agent = ReplayAgent::new();
    agent.push(Ok(AgentResult::ok(json!({
        "delivery_status": "sent",
        "messages_sent": [{
            "channel": format!("#{}", channel),
            "message_type": "roadmap_update",
            "status": "sent",
            "preview": preview,
        }],
        "summary": format!("Roadmap update sent to #{}", channel),
    }))));
    Box::new(agent)
}

/// Generate while echoing the rotating progress line to stderr.
async fn run_with_progress(state: &AppState, agent: &dyn AgentInvoker) -> Outcome {
    let work = updates::generate_update(state, agent);
    tokio::pin!(work);
    let mut ticker = tokio::time::interval(Duration::from_secs(PROGRESS_ROTATION_SECS as u64));
    let mut last = None;
    loop {
        tokio::select! {
            outcome = &mut work => return outcome,
            _ = ticker.tick() => {
                if let Some(line) = state.generation_status().progress_message(Utc::now()) {
                    if last != Some(line) {
                        eprintln!("{}", line);
                        last = Some(line);
                    }
                }
            }
        }
    }
}

/// Zero-based index for a 1-based position given on the command line.
fn item_index(position: usize) -> Result<usize, PulseError> {
    position
        .checked_sub(1)
        .ok_or_else(|| PulseError::Precondition("Action item positions start at 1".to_string()))
}

fn report(outcome: &Outcome) -> bool {
    match outcome {
        Outcome::Success { message } => {
            println!("{}", message);
            true
        }
        Outcome::Failure { error } => {
            eprintln!("Error: {}", error.message);
            if !error.recovery_suggestion.is_empty() {
                eprintln!("{}", error.recovery_suggestion);
            }
            false
        }
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "--"
    } else {
        value
    }
}

fn print_update(update: &Update, draft: Option<&DraftBuffer>) {
    println!("{} · {}", update.project_name, update.id);
    println!("Generated {}", format_timestamp(&update.generated_at));
    if let Some(status) = update.delivery_status.as_deref() {
        println!("Delivery: {}", status);
    }
    println!(
        "\n{}% complete [{}: {}]",
        update.summary.completion_percentage,
        update.summary.status,
        status_tone(&update.summary.status).as_str()
    );
    if !update.summary.narrative_text.is_empty() {
        println!("{}", update.summary.narrative_text);
    }

    if !update.features.is_empty() {
        println!("\nFeatures");
        for f in &update.features {
            println!(
                "  {:<28} {:>3}%  {} [{}]  updated {}",
                f.name,
                f.progress,
                f.status,
                status_tone(&f.status).as_str(),
                format_date(&f.last_updated)
            );
            if !f.change_note.is_empty() {
                println!("      {}", f.change_note);
            }
        }
    }

    if !update.timeline_changes.is_empty() {
        println!("\nTimeline changes");
        for t in &update.timeline_changes {
            println!(
                "  {}: {} -> {} [{}]",
                t.feature,
                format_date(&t.original_date),
                format_date(&t.new_date),
                severity_tone(&t.severity).as_str()
            );
            if !t.impact.is_empty() {
                println!("      Impact: {}", t.impact);
            }
            if !t.reason.is_empty() {
                println!("      {}", t.reason);
            }
        }
    }

    if !update.dependencies.is_empty() {
        println!("\nDependencies");
        for d in &update.dependencies {
            println!(
                "  {} -> {}  {}{}",
                d.from_feature,
                d.to_feature,
                d.status,
                if d.is_blocker { "  BLOCKER" } else { "" }
            );
        }
    }

    if !update.risk_indicators.is_empty() {
        println!("\nRisks");
        for r in &update.risk_indicators {
            println!(
                "  [{}] {} ({})",
                severity_tone(&r.severity).as_str(),
                r.title,
                r.severity
            );
            if !r.mitigation.is_empty() {
                println!("      Mitigation: {}", r.mitigation);
            }
        }
    }

    print_action_items(&update.action_items, draft);
}

fn print_action_items(items: &[ActionItem], draft: Option<&DraftBuffer>) {
    if items.is_empty() {
        return;
    }
    match draft {
        Some(d) => println!("\nAction items ({}/{} done)", d.checked_count(), items.len()),
        None => println!("\nAction items"),
    }
    for (i, a) in items.iter().enumerate() {
        let mark = if draft.is_some_and(|d| d.is_checked(i)) { "x" } else { " " };
        println!(
            "  {}. [{}] {}  ({}, {} [{}], due {})",
            i + 1,
            mark,
            a.task,
            display_or_dash(&a.assignee),
            a.priority,
            priority_tone(&a.priority).as_str(),
            format_date(&a.due_date)
        );
    }
}
