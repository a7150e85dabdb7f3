//! Light effect and profile handlers.

use super::{Context, util};
use crate::cli::{LightsArgs, LightsCommand, ProfilesArgs, ProfilesCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle_lights(ctx: &Context, args: LightsArgs) -> Result<(), CliError> {
    util::connect(ctx).await?;
    let api = ctx.remote.api();
    let store = ctx.remote.stores().lights();

    match args.command {
        LightsCommand::List => {
            store.update().await?;
            let out = output::render_names(ctx.output, &store.names(), "Effect");
            output::print_output(&out, ctx.quiet);
        }
        LightsCommand::Set { effect } => {
            util::require_name(store, &effect, "light effect", "lights list").await?;
            api.set_light_effect(&effect).await?;
            util::done(ctx, &format!("Light effect '{effect}' started"));
        }
        LightsCommand::Stop { effect } => {
            util::require_name(store, &effect, "light effect", "lights list").await?;
            api.stop_light_effect(&effect).await?;
            util::done(ctx, &format!("Light effect '{effect}' stopped"));
        }
        LightsCommand::Clear => {
            api.clear_lights().await?;
            util::done(ctx, "Light effects cleared");
        }
    }
    Ok(())
}

pub async fn handle_profiles(ctx: &Context, args: ProfilesArgs) -> Result<(), CliError> {
    util::connect(ctx).await?;
    let store = ctx.remote.stores().profiles();

    match args.command {
        ProfilesCommand::List => {
            store.update().await?;
            let out = output::render_names(ctx.output, &store.names(), "Profile");
            output::print_output(&out, ctx.quiet);
        }
        ProfilesCommand::Set { profile } => {
            util::require_name(store, &profile, "profile", "profiles list").await?;
            ctx.remote.api().set_profile(&profile).await?;
            util::done(ctx, &format!("Profile '{profile}' applied"));
        }
    }
    Ok(())
}
