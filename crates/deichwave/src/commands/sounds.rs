//! Sound effect handlers.

use deichwave_core::SoundDetails;

use super::{Context, util};
use crate::cli::{SoundsArgs, SoundsCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(ctx: &Context, args: SoundsArgs) -> Result<(), CliError> {
    util::connect(ctx).await?;
    let api = ctx.remote.api();
    let store = ctx.remote.stores().sounds();

    match args.command {
        SoundsCommand::List => {
            store.update().await?;
            let out = output::render_names(ctx.output, &store.names(), "Sound");
            output::print_output(&out, ctx.quiet);
        }
        SoundsCommand::Show { name } => {
            let details = api
                .sound(&name)
                .await
                .map_err(|e| util::not_found_as(e, "sound", &name, "sounds list"))?;
            let out = output::render_single(ctx.output, &details, sound_detail, |d| {
                d.name.clone()
            });
            output::print_output(&out, ctx.quiet);
        }
        SoundsCommand::Play { name } => {
            util::require_name(store, &name, "sound", "sounds list").await?;
            api.play_sound(&name).await?;
            util::done(ctx, &format!("Playing '{name}'"));
        }
        SoundsCommand::Loop { name } => {
            util::require_name(store, &name, "sound", "sounds list").await?;
            api.loop_sound(&name).await?;
            util::done(ctx, &format!("Looping '{name}'"));
        }
        SoundsCommand::Unloop { name } => {
            util::require_name(store, &name, "sound", "sounds list").await?;
            api.unloop_sound(&name).await?;
            util::done(ctx, &format!("Stopped looping '{name}'"));
        }
    }
    Ok(())
}

fn sound_detail(d: &SoundDetails) -> String {
    let mut lines = vec![format!("Name:     {}", d.name)];
    if let Some(count) = d.buffer_count {
        lines.push(format!("Variants: {count}"));
    }
    for (key, value) in &d.extra {
        lines.push(format!("{key}: {}", output::value_text(value)));
    }
    lines.join("\n")
}
