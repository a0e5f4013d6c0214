use genvr_batch::{run_batch, CancelToken, Credentials, GenVrClient, JobRequest};
use serde_json::{Map, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let uid = std::env::var("GENVR_UID")?;
    let api_key = std::env::var("GENVR_API_KEY")?;

    let client = GenVrClient::new(
        "https://api.genvrresearch.com",
        Credentials::new(uid, api_key),
    );

    let prompts = [
        "a beautiful sunset over mountains",
        "a futuristic city with flying cars",
        "a cute cat playing with yarn",
        "an astronaut floating in space",
        "a serene lake surrounded by trees",
    ];
    let requests: Vec<JobRequest> = prompts
        .iter()
        .enumerate()
        .map(|(i, prompt)| {
            let mut params = Map::new();
            params.insert("prompt".into(), Value::String(prompt.to_string()));
            JobRequest::new(i, "imggen", "text_to_image", params)
        })
        .collect();

    // Ctrl+C flips the shared token; in-flight jobs stop at their next
    // poll checkpoint and pending ones are marked Cancelled.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            println!("Stopping...");
            cancel.cancel();
        });
    }

    let run = run_batch(client, requests, 3, cancel, |event| {
        println!("{}", event.progress_line());
    })
    .await;

    println!(
        "Done: {} total, {} successful, {} failed, {} cancelled",
        run.total(),
        run.successful(),
        run.failed(),
        run.cancelled()
    );
    for artifact in run.artifacts() {
        println!(
            "  request {} output {}: {}",
            artifact.request_index, artifact.position, artifact.reference
        );
    }

    std::fs::write(
        "batch_results.json",
        serde_json::to_string_pretty(&run.export()?)?,
    )?;
    println!("Exported results to batch_results.json");
    Ok(())
}
