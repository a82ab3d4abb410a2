use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{share_link, share_text, QuizClient, SaveButton, SaveFeedback, SubmitOutcome};
use shared::domain::QuizId;
use tracing::debug;

mod config;
mod script;

#[derive(Parser, Debug)]
#[command(name = "quizctl", about = "Drive quiz page forms from the command line")]
struct Cli {
    /// Settings file; defaults to ./quizctl.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a formset action script and print every view update.
    Formset {
        #[arg(long)]
        script: PathBuf,
    },
    /// Replay a script, validate it and post the quiz form.
    Submit {
        #[arg(long)]
        script: PathBuf,
        #[arg(long, default_value = "/quizzes/create/")]
        path: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Toggle the saved state of a quiz.
    Save {
        #[arg(long)]
        quiz_id: i64,
        #[arg(long, default_value_t = false)]
        saved: bool,
        #[arg(long, default_value = "/")]
        current_path: String,
    },
    /// Print the absolute share link of a quiz.
    Share {
        #[arg(long)]
        path: String,
        #[arg(long)]
        title: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url.as_deref() {
        settings.base_url = config::normalize_base_url(base_url);
    }
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    match cli.command {
        Command::Formset { script } => {
            let script = script::load_script(&script)?;
            let (formset, reports) = script::replay(script, &settings.formset_prefix);
            for report in &reports {
                println!("{}", serde_json::to_string(report)?);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&formset.submission())?
            );
        }
        Command::Submit {
            script,
            path,
            title,
            description,
        } => {
            let script = script::load_script(&script)?;
            let (mut formset, _) = script::replay(script, &settings.formset_prefix);
            let validation = formset.validate_before_submit();
            if !validation.is_valid() {
                for update in &validation.updates {
                    println!("{}", serde_json::to_string(update)?);
                }
                bail!(
                    "quiz form failed validation ({} offending fields)",
                    validation.offending.len()
                );
            }

            let submission = formset
                .submission()
                .with_field("title", title)
                .with_field("description", description);
            let client = build_client(&settings)?;
            match client.submit_formset(&path, &submission).await? {
                SubmitOutcome::Redirected(location) => println!("saved: {location}"),
                SubmitOutcome::Rejected { status } => {
                    bail!("server re-rendered the quiz form (status {status})")
                }
            }
        }
        Command::Save {
            quiz_id,
            saved,
            current_path,
        } => {
            let client = build_client(&settings)?;
            let mut button = SaveButton::new(QuizId(quiz_id), saved);
            match button.toggle(&client, &current_path).await {
                SaveFeedback::Updated { notice, .. } => {
                    println!("{} [{}]", notice.message, button.label())
                }
                SaveFeedback::Redirect(location) => {
                    bail!("sign-in required: {}{location}", settings.base_url)
                }
                SaveFeedback::Failed(notice) => bail!("{}", notice.message),
            }
        }
        Command::Share { path, title } => {
            let link = share_link(&settings.base_url, &path)?;
            println!("{}", share_text(&title));
            println!("{link}");
        }
    }

    Ok(())
}

fn build_client(settings: &config::Settings) -> Result<QuizClient> {
    let mut client = QuizClient::new(&settings.base_url)
        .with_context(|| format!("invalid base url '{}'", settings.base_url))?;
    if let Some(token) = &settings.csrf_token {
        client = client.with_csrf_token(token.clone());
    }
    if let Some(session_id) = &settings.session_id {
        client = client.with_session(session_id.clone());
    }
    debug!(
        base_url = %settings.base_url,
        has_csrf_token = settings.csrf_token.is_some(),
        "quiz client ready"
    );
    Ok(client)
}
