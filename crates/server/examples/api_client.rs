//! Examples for using the OpenDesk Server API

use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:8080";
const STAFF_KEY: &str = "demo-staff-key-12345";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: Create a select custom field
    println!("2. Create Custom Field:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/system/add-custom-field"))
        .header("X-API-Key", STAFF_KEY)
        .json(&json!({
            "name": "Priority",
            "type": "select",
            "description": "How urgent the request is",
            "options": "[\"Low\",\"Medium\",\"High\"]"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: Create a text custom field
    println!("3. Create Text Custom Field:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/system/add-custom-field"))
        .header("X-API-Key", STAFF_KEY)
        .json(&json!({
            "name": "Account Number",
            "type": "text",
            "description": "Internal billing reference"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 4: List custom fields (public)
    println!("4. List Custom Fields:");
    let resp = client
        .get(format!("{SERVER_URL}/api/v1/system/custom-fields"))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 5: Invite a user with custom field values
    println!("5. Invite User:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/user/invite"))
        .header("X-API-Key", STAFF_KEY)
        .json(&json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "customFields": {
                "Priority": "High",
                "Account Number": "ACC-1042"
            }
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 6: Server metadata
    println!("6. Server Metadata:");
    let resp = client
        .get(format!("{SERVER_URL}/api/v1/metadata"))
        .header("X-API-Key", STAFF_KEY)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 7: Metrics
    println!("7. Prometheus Metrics:");
    let resp = client.get(format!("{SERVER_URL}/metrics")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("All examples completed!");
    Ok(())
}
