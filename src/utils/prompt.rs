//! User prompt utilities for interactive confirmation

use anyhow::Result;
use dialoguer::{Confirm, Select};

/// Ask user for yes/no confirmation
pub fn confirm(prompt: &str) -> Result<bool> {
    let result = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    Ok(result)
}

/// Let the user pick one entry from a list, returning its index
pub fn select<T: ToString>(prompt: &str, items: &[T]) -> Result<usize> {
    let select = items
        .iter()
        .fold(Select::new().with_prompt(prompt), |s, item| {
            s.item(item.to_string())
        });
    let index = select.default(0).interact()?;

    Ok(index)
}
