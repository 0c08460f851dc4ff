use std::path::Path;

use gallery_wall_core::{
    Preference, PreferenceEdit, StyleVariableSet, preferences::parse_value,
};
use tracing::debug;

use crate::context::{CliContext, read_config};
use crate::preview;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Accepts storage keys (`frameWidth`) and kebab-case (`frame-width`)
pub fn parse_preference(name: &str) -> Result<Preference, String> {
    Preference::from_storage_key(name)
        .or_else(|| {
            Preference::ALL
                .into_iter()
                .find(|p| p.css_variable().trim_start_matches("--gw-") == name)
        })
        .ok_or_else(|| {
            format!("unknown preference '{name}' (wallColor, frameColor, frameWidth, countPerRow)")
        })
}

pub fn classify(path: &str, ctx: &CliContext) -> Result<(), String> {
    let capability = ctx.matcher().classify(path);
    println!(
        "{path}\n  wall color: {}\n  frame color: {}",
        yes_no(capability.wall_color_eligible),
        yes_no(capability.frame_color_eligible)
    );
    Ok(())
}

pub fn show_variables(ctx: &CliContext) -> Result<(), String> {
    let variables = StyleVariableSet::from_preferences(ctx.store().snapshot());
    for (name, value) in variables.entries() {
        println!("{name}: {value};");
    }
    Ok(())
}

pub fn set_preference(name: &str, value: &str, ctx: &mut CliContext) -> Result<(), String> {
    let preference = parse_preference(name)?;
    let edit = match preference {
        Preference::WallColor => PreferenceEdit::WallColor {
            value: value.to_string(),
        },
        Preference::FrameColor => PreferenceEdit::FrameColor {
            value: value.to_string(),
        },
        Preference::FrameWidth | Preference::CountPerRow => {
            let value: i32 = value
                .trim()
                .parse()
                .map_err(|_| format!("{preference} expects a whole number, got '{value}'"))?;
            if preference == Preference::FrameWidth {
                PreferenceEdit::FrameWidth { value }
            } else {
                PreferenceEdit::CountPerRow { value }
            }
        }
    };
    apply(&edit, ctx)
}

pub fn step_preference(name: &str, delta: i32, ctx: &mut CliContext) -> Result<(), String> {
    let preference = parse_preference(name)?;
    apply(&PreferenceEdit::Step { preference, delta }, ctx)
}

fn apply(edit: &PreferenceEdit, ctx: &mut CliContext) -> Result<(), String> {
    debug!(?edit, "applying preference edit");
    let store = ctx.store_mut();
    let preference = store.apply(edit).map_err(|e| e.to_string())?;
    println!(
        "{preference} = {}",
        store.get(preference).to_storage_string()
    );
    Ok(())
}

/// Load a stored value the way the content script would see it
pub fn import_value(name: &str, raw: &str, ctx: &mut CliContext) -> Result<(), String> {
    let preference = parse_preference(name)?;
    match parse_value(preference, raw) {
        Some(value) => {
            ctx.store_mut().set(preference, value);
            println!("{preference} = {}", ctx.store().get(preference).to_storage_string());
        }
        None => println!(
            "'{raw}' is not a valid stored {preference}; the default would be used"
        ),
    }
    Ok(())
}

pub fn check_config(path: &str, ctx: &mut CliContext) -> Result<(), String> {
    let path = Path::new(path);
    let config = read_config(path)?;
    println!(
        "{} is valid ({} wall-color keywords, {} frame-color keywords, {} sites)",
        path.display(),
        config.routes.wall_color.len(),
        config.routes.frame_color.len(),
        config.sites.len()
    );
    ctx.replace_config(config, path.to_path_buf());
    Ok(())
}

pub fn show_config(ctx: &CliContext) -> Result<(), String> {
    match &ctx.config_path {
        Some(path) => println!("# loaded from {}", path.display()),
        None => println!("# built-in defaults"),
    }
    let rendered = toml::to_string_pretty(&ctx.config).map_err(|e| e.to_string())?;
    print!("{rendered}");
    Ok(())
}

pub fn preview(path: &str, ctx: &CliContext) -> Result<(), String> {
    let result = preview::run(&ctx.config, ctx.store().storage().clone(), path)?;
    let report = &result.report;

    println!("{} -> {:?}", report.path, report.outcome);
    println!(
        "  wall color: {}  frame color: {}",
        yes_no(report.capability.wall_color_eligible),
        yes_no(report.capability.frame_color_eligible)
    );
    println!("  styled writes: {}", report.styled);
    if !report.missing.is_empty() {
        println!("  missing anchors: {}", report.missing.join(", "));
    }

    println!();
    for (name, value) in &result.variables {
        println!("  {name}: {value}");
    }
    println!();
    for (node, style) in &result.styles {
        println!("  {node:?}: {style}");
    }
    Ok(())
}

pub fn exit() {
    println!("quitting...");
}
