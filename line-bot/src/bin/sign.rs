//! Print the `X-Line-Signature` value for a request body.
//!
//! Handy for replaying webhook deliveries with curl:
//!
//! ```text
//! line-bot-sign body.json | xargs -I{} curl -H 'X-Line-Signature: {}' --data @body.json localhost:8080/webhook
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use declutter::web::compute_signature;

#[derive(Debug, Parser)]
#[command(name = "line-bot-sign", about = "Compute a LINE webhook signature")]
struct Args {
    /// Channel secret used as the HMAC key
    #[arg(long, env = "LINE_CHANNEL_SECRET", hide_env_values = true)]
    secret: String,

    /// Body file; reads stdin when omitted
    body: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let body = match &args.body {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    println!("{}", compute_signature(args.secret.as_bytes(), &body));
    Ok(())
}
