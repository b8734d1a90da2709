//! Posts a JSON document to an echo service and prints what came back.
//!
//! ```sh
//! RUST_LOG=http_agent=debug cargo run --example fetch_json -- https://httpbin.org/anything
//! ```

use http_agent::{Agent, AgentError};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/anything".to_string());

    let transfer = Agent::post(url)
        .set("Accept", "application/json")
        .send(&json!({ "greeting": "hello", "count": 3 }))?
        .end(|outcome| match outcome {
            Ok(resp) => {
                println!("{} {}", resp.status(), resp.meta.status_text);
                println!("{:#}", resp.body);
            }
            Err(AgentError::Decode { meta, body, source }) => {
                eprintln!("{} returned a non-JSON body ({source}):", meta.status);
                eprintln!("{}", String::from_utf8_lossy(&body));
            }
            Err(e) => eprintln!("request failed: {e}"),
        });

    log::info!("transfer {} started", transfer.id());
    transfer.join().await?;

    Ok(())
}
