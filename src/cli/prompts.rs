//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};

use crate::pipeline::{CategoricalField, FilterParams};

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm writing the requested exports
pub fn confirm_export(table_count: usize) -> Result<bool> {
    let message = format!("Export {} chart table(s)?", table_count);
    confirm_step(&message)
}

/// Turn the ticked levels of one field into a selection.
/// All or nothing ticked means the field is unconstrained.
pub fn selection_from_ticks(field: CategoricalField, ticked: &[usize]) -> Option<Vec<String>> {
    let levels = field.levels();
    if ticked.is_empty() || ticked.len() >= levels.len() {
        return None;
    }
    Some(
        ticked
            .iter()
            .filter_map(|&i| levels.get(i))
            .map(|l| l.to_string())
            .collect(),
    )
}

/// Ask for a level selection on every categorical field, starting from `params`
pub fn prompt_category_filters(mut params: FilterParams) -> Result<FilterParams> {
    let theme = ColorfulTheme::default();

    for field in CategoricalField::ALL {
        let levels = field.levels();
        let current = params.categories.get(&field);
        let defaults: Vec<bool> = levels
            .iter()
            .map(|level| current.map_or(true, |sel| sel.is_empty() || sel.contains(*level)))
            .collect();

        let ticked = MultiSelect::with_theme(&theme)
            .with_prompt(format!("{} (space to toggle, enter to accept)", field))
            .items(levels)
            .defaults(&defaults)
            .interact()?;

        match selection_from_ticks(field, &ticked) {
            Some(selected) => params = params.select(field, selected),
            None => {
                params.categories.remove(&field);
            }
        }
    }

    Ok(params)
}
