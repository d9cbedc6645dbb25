//! Reads tool calls as JSON lines on stdin and prints each result.
//!
//! ```text
//! {"name": "song_get_tempo"}
//! {"name": "track_set_volume", "arguments": {"track_index": 0, "volume": 0.7}}
//! ```
//!
//! `list` prints the tool descriptors.

use ableton_osc::{tools::ToolSurface, AbletonOSC, Config, Error};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let live = AbletonOSC::connect(Config::from_env()?).await?;
    let tools = ToolSurface::new(&live);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "list" {
            println!("{}", serde_json::to_string_pretty(&ToolSurface::tools())?);
            continue;
        }

        let request: Value = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                println!("{}", serde_json::json!({ "status": "error", "message": err.to_string() }));
                continue;
            }
        };
        let name = request.get("name").and_then(Value::as_str).unwrap_or("");
        let arguments = request.get("arguments").cloned().unwrap_or(Value::Null);
        let result = tools.handle_tool_call(name, &arguments).await;
        println!("{}", serde_json::to_string(&result)?);
    }

    Ok(())
}
