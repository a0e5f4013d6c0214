use genvr_batch::{Credentials, GenVrClient};
use serde_json::{Map, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let uid = std::env::var("GENVR_UID")?;
    let api_key = std::env::var("GENVR_API_KEY")?;

    let client = GenVrClient::new(
        "https://api.genvrresearch.com",
        Credentials::new(uid, api_key),
    );

    // Background change: the 3-step workflow (generate -> status -> response)
    // runs behind this one call.
    let mut params = Map::new();
    params.insert(
        "image_url".into(),
        Value::String("https://example.com/your-image.jpg".into()),
    );
    params.insert(
        "prompt".into(),
        Value::String("a beautiful sunset beach".into()),
    );

    let output = client
        .generate("imgedit", "background_change", params)
        .await?;

    println!("Output: {}", output);
    Ok(())
}
