//! Browser automation integration tests
//!
//! These drive a live API and a real browser session. Run with
//! `cargo test -- --ignored` after installing agent-browser and exporting
//! OPENAI_API_KEY.

use errand::agent::Agent;
use errand::core::Config;
use std::time::Duration;
use tokio::time::timeout;

/// Helper to create a configured agent for live tests
async fn create_live_agent() -> Result<Agent, Box<dyn std::error::Error>> {
    if std::env::var("OPENAI_API_KEY").is_err() {
        return Err("OPENAI_API_KEY not set".into());
    }

    let mut config = Config::default();
    config.browser.enabled = true;
    config.browser.headed = false;
    config.agent.max_steps = 8;
    config.agent.debug = false;

    let mut agent = Agent::with_config(config)?;
    agent.initialize().await?;

    Ok(agent)
}

/// Test basic navigation
#[tokio::test]
#[ignore] // Requires agent-browser and a live API key
async fn test_navigate_to_example_com() {
    let mut agent = match create_live_agent().await {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    let result = timeout(
        Duration::from_secs(120),
        agent.run("Navigate to https://example.com and report the page heading"),
    )
    .await;

    match result {
        Ok(Ok(run)) => {
            println!("Result:\n{}", run);
            assert!(!run.answer.is_empty());
            assert!(run.steps_used >= 1);
        }
        Ok(Err(e)) => panic!("Run failed: {}", e),
        Err(_) => panic!("Run timed out"),
    }
}

/// Test a search workflow with fills and clicks
#[tokio::test]
#[ignore]
async fn test_search_workflow() {
    let mut agent = match create_live_agent().await {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    let result = timeout(
        Duration::from_secs(180),
        agent.run(
            "Go to duckduckgo.com, find the search box ref from the element listing, \
             fill it with 'Rust programming language', press Enter, and report the \
             title of the first result",
        ),
    )
    .await;

    match result {
        Ok(Ok(run)) => {
            println!("Search workflow result:\n{}", run);
        }
        Ok(Err(e)) => {
            eprintln!("Search workflow error (acceptable): {}", e);
        }
        Err(_) => {
            eprintln!("Run timed out (may be acceptable for slow pages)");
        }
    }
}

/// A run that exhausts its step budget must still return a printable result
#[tokio::test]
#[ignore]
async fn test_step_budget_produces_result() {
    let mut agent = match create_live_agent().await {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    agent.config_mut().agent.max_steps = 1;

    let result = timeout(
        Duration::from_secs(120),
        agent.run("Compare prices for five different mechanical keyboards across three shops"),
    )
    .await;

    match result {
        Ok(Ok(run)) => {
            // One step cannot finish this; the synthesized report must still print
            assert!(!run.to_string().is_empty());
        }
        Ok(Err(e)) => panic!("Run failed: {}", e),
        Err(_) => panic!("Run timed out"),
    }
}
