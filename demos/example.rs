use datagraphs::{Config, DataGraphsClient, RequestOptions, ids};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // DATAGRAPHS_PROJECT_ID, DATAGRAPHS_API_KEY and optionally DATAGRAPHS_CLIENT_ID/SECRET
    let client = DataGraphsClient::new(Config::from_env()?)?;

    let datasets: serde_json::Value = client
        .get_json("", RequestOptions::new().query("pageSize", "5"))
        .await?;
    println!("{datasets:#}");

    let concept = ids::parse_concept_id("urn:my-project:person:ada")?;
    let person: serde_json::Value = client
        .get_json(&concept.path(), RequestOptions::new().bypass_cache())
        .await?;
    println!("{person:#}");
    Ok(())
}
