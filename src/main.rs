use anyhow::Result;

fn main() -> Result<()> {
    tabscrape::cli::run()?;
    Ok(())
}
