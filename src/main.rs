use anyhow::Result;
use tokio::io::BufReader;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize core
    weathercards_core::init()?;

    let app = weathercards_ui::App::new()?;
    tracing::info!(
        "Weathercards started, config directory {}",
        app.config().config_dir.display()
    );

    println!("Weathercards - city weather at a glance");

    let stdin = BufReader::new(tokio::io::stdin());
    app.run(stdin, std::io::stdout()).await?;

    tracing::info!("Weathercards stopped");
    Ok(())
}
