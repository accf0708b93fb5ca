use chat_completion_client::Client;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reads API_KEY, API_URL and the optional MODEL / TEMPERATURE overrides.
    let client = Client::from_env()?;

    let reply = client.complete("Say hello in one sentence.").await?;
    println!("{}", reply);

    Ok(())
}
