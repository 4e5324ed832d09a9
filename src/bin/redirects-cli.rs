use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use redirect_gateway::config::load_config;
use redirect_gateway::routing::{
    Evaluation, MatchOutcome, Redirect, Redirector, RequestTarget, Resolution,
};

#[derive(Parser)]
#[command(name = "redirects-cli")]
#[command(about = "Evaluate redirect rules offline", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "redirects.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one absolute URL against the rules
    Resolve {
        url: String,

        /// Show the verdict of every rule that was evaluated
        #[arg(long)]
        explain: bool,
    },
    /// List rules in evaluation order
    Rules,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redirect_gateway=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let redirector = Redirector::from_config(config.redirects);

    let output = match cli.command {
        Commands::Resolve { url, explain } => {
            let target = RequestTarget::from_absolute(&url)?;
            let mut output = resolution_json(&url, &redirector.resolve(&target));
            if explain {
                output["rules"] = redirector
                    .explain(&target)
                    .iter()
                    .map(evaluation_json)
                    .collect();
            }
            output
        }
        Commands::Rules => serde_json::to_value(redirector.rules())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn resolution_json(url: &str, resolution: &Resolution<'_>) -> Value {
    match resolution {
        Resolution::Redirect(redirect) => {
            let mut value = redirect_json(redirect);
            value["url"] = json!(url);
            value["outcome"] = json!("redirect");
            value
        }
        Resolution::PassThrough => json!({ "url": url, "outcome": "pass_through" }),
    }
}

fn redirect_json(redirect: &Redirect<'_>) -> Value {
    let params: serde_json::Map<String, Value> = redirect
        .captures
        .params
        .iter()
        .map(|(name, value)| (name.clone(), json!(value)))
        .collect();

    json!({
        "status": redirect.rule.status,
        "location": redirect.target.to_string(),
        "cross_host": redirect.cross_host,
        "rule": redirect.rule,
        "params": params,
        "splat": redirect.captures.trailing,
    })
}

fn evaluation_json(evaluation: &Evaluation<'_>) -> Value {
    let verdict = match &evaluation.result {
        Ok(MatchOutcome::NoMatch) => json!({ "outcome": "no_match" }),
        Ok(MatchOutcome::Disqualified(reason)) => {
            json!({ "outcome": "disqualified", "reason": reason.as_str() })
        }
        Ok(MatchOutcome::Equivalent { target }) => {
            json!({ "outcome": "equivalent", "target": target.to_string() })
        }
        Ok(MatchOutcome::Redirect(redirect)) => {
            let mut value = redirect_json(redirect);
            value["outcome"] = json!("redirect");
            value
        }
        Err(e) => json!({ "outcome": "error", "error": e.to_string() }),
    };

    json!({
        "index": evaluation.index,
        "from": evaluation.rule.from,
        "to": evaluation.rule.to,
        "verdict": verdict,
    })
}
