//! Lambda bridge replay tool.
//!
//! Feeds a saved function event through the translators without deploying:
//! - `request`: print the normalized request as CGI variables
//! - `echo`: run a built-in echo application and print the outbound envelope

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use lambda_bridge::{
    Adapter, Config, InboundEvent, InvocationContext, NormalizedRequest, RequestTranslator,
    Response,
};

/// Request id used when no context file is given.
const REPLAY_REQUEST_ID: &str = "replay-request";

/// Function ARN used when no context file is given.
const REPLAY_FUNCTION_ARN: &str = "arn:aws:lambda:local:000000000000:function:replay";

#[derive(Debug, Parser)]
#[command(
    name = "lambda-bridge",
    about = "Replay function events through the HTTP bridge",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the normalized request for an event
    Request(ReplayArgs),
    /// Answer an event with an echo application and print the envelope
    Echo(ReplayArgs),
}

#[derive(Debug, Args)]
struct ReplayArgs {
    /// Event JSON file
    event: PathBuf,

    /// Invocation context JSON file (default: built from AWS_LAMBDA_* variables)
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// Drop the stage prefix even for gateway hostnames (also STRIP_STAGE_PATH)
    #[arg(long)]
    strip_stage_path: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    lambda_bridge::observability::init_tracing(&config.observability);

    match cli.command {
        Commands::Request(args) => {
            config.translation.strip_stage_path |= args.strip_stage_path;
            let event = InboundEvent::from_slice(&std::fs::read(&args.event)?)?;
            let context = load_context(args.context.as_deref())?;

            let request = RequestTranslator::new(config.translation).translate(&event, &context)?;
            tracing::info!(format = %request.format(), uri = %request.uri(), "event_replayed");
            println!("{}", serde_json::to_string_pretty(&request.environ())?);
        }
        Commands::Echo(args) => {
            config.translation.strip_stage_path |= args.strip_stage_path;
            let event: serde_json::Value = serde_json::from_slice(&std::fs::read(&args.event)?)?;
            let context = load_context(args.context.as_deref())?;

            let adapter = Adapter::new(echo, config.translation);
            let envelope = adapter.handle_json(event, &context)?;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
    }

    Ok(())
}

fn load_context(path: Option<&Path>) -> Result<InvocationContext, Box<dyn Error>> {
    match path {
        Some(path) => Ok(serde_json::from_slice(&std::fs::read(path)?)?),
        None => Ok(InvocationContext::from_env(
            REPLAY_REQUEST_ID,
            REPLAY_FUNCTION_ARN,
        )),
    }
}

/// Answers with the request's CGI variables, body and context as JSON.
fn echo(mut request: NormalizedRequest) -> Response {
    let body = request.body_mut().take_bytes();
    let payload = serde_json::json!({
        "environ": request.environ(),
        "body": String::from_utf8_lossy(&body),
        "context": request.context(),
    });

    match serde_json::to_vec_pretty(&payload) {
        Ok(bytes) => Response::new(200)
            .with_header("Content-Type", "application/json")
            .with_body(bytes),
        Err(err) => Response::new(500)
            .with_header("Content-Type", "text/plain")
            .with_body(err.to_string()),
    }
}
