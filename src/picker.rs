use crate::MyError;
use crate::preset::Preset;
use skim::prelude::*;

fn preset_line(index: usize, preset: &Preset) -> String {
    let engine = preset
        .engine
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "no engine".to_string());
    format!("{}\t{} ({})", index + 1, preset.name, engine)
}

/// Index of the picked line, parsed back from its leading number.
fn picked_index(line: &str, len: usize) -> Option<usize> {
    let number: usize = line.split('\t').next()?.trim().parse().ok()?;
    (1..=len).contains(&number).then(|| number - 1)
}

/// Lets the user pick a preset with a fuzzy finder. `None` when the picker was cancelled.
pub(crate) fn pick_preset(presets: &[Preset]) -> Result<Option<usize>, Box<dyn std::error::Error>> {
    if presets.is_empty() {
        return Err(MyError("No presets to pick from.".to_string()).into());
    }

    let options = SkimOptionsBuilder::default()
        .height(Some("70%"))
        .prompt(Some("Select preset> "))
        .reverse(true)
        .multi(false)
        .build()
        .map_err(|e| MyError(format!("Failed to build skim options: {}", e)))?;

    let input = presets
        .iter()
        .enumerate()
        .map(|(i, p)| preset_line(i, p))
        .collect::<Vec<String>>()
        .join("\n");
    let reader = SkimItemReader::default();
    let items = reader.of_bufread(std::io::Cursor::new(input));
    let selected = Skim::run_with(&options, Some(items))
        .filter(|out| !out.is_abort)
        .map(|out| out.selected_items)
        .unwrap_or_default();

    let Some(item) = selected.first() else {
        return Ok(None);
    };
    let index = picked_index(&item.output(), presets.len())
        .ok_or_else(|| MyError("Selected preset not found.".to_string()))?;
    Ok(Some(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picked_line_maps_back_to_its_preset() {
        let presets = vec![Preset::named("Coop"), Preset::named("Speedrun")];
        let line = preset_line(1, &presets[1]);
        assert_eq!(line, "2\tSpeedrun (no engine)");
        assert_eq!(picked_index(&line, presets.len()), Some(1));
        assert_eq!(picked_index("9\tGhost", presets.len()), None);
        assert_eq!(picked_index("garbage", presets.len()), None);
    }
}
