use anyhow::Result;

fn main() -> Result<()> {
    gameshelf::cli::run()
}
