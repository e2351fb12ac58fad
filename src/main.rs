fn main() -> miette::Result<()> {
    spoof::cli::run()?;
    Ok(())
}
