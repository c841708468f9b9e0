use super::context::AppContext;
use super::prompts;
use super::spinner::is_interactive;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;

pub async fn run_clear(yes: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let key = ctx.config.storage.watched_key.clone();
    let backend = ctx.storage_backend();

    let count = match backend.read(&key) {
        Ok(Some(content)) => serde_json::from_str::<Vec<serde_json::Value>>(&content).map(|v| v.len()).ok(),
        Ok(None) => {
            output.info("Your watched list is already empty");
            return Ok(());
        }
        Err(e) => return Err(eyre!("Failed to read the watched list: {}", e)),
    };

    if !yes {
        if !is_interactive() {
            return Err(eyre!("Refusing to clear without confirmation; pass --yes"));
        }
        let prompt = match count {
            Some(n) => format!("Delete your watched list ({} movies)?", n),
            None => "Delete your watched list?".to_string(),
        };
        if !prompts::prompt_yes_no(&prompt, Some(false))? {
            output.info("Nothing cleared");
            return Ok(());
        }
    }

    backend
        .remove(&key)
        .map_err(|e| eyre!("Failed to clear the watched list: {}", e))?;
    output.success("Cleared your watched list");
    Ok(())
}
