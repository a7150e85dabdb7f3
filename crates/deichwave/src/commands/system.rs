//! `battery`, `shell` and `info` handlers.

use super::{Context, status, util};
use crate::cli::{InfoArgs, ShellArgs};
use crate::error::CliError;
use crate::output;

pub async fn battery(ctx: &Context) -> Result<(), CliError> {
    util::connect(ctx).await?;
    let state = ctx.remote.battery().poll_once().await?;
    let out = output::render_single(
        ctx.output,
        &state,
        |s| format!("Battery: {}", status::battery_text(s)),
        status::battery_text,
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn shell(ctx: &Context, args: ShellArgs) -> Result<(), CliError> {
    util::connect(ctx).await?;
    let stdout = ctx
        .remote
        .api()
        .run_shell(&args.command)
        .await?;
    let out = output::render_single(
        ctx.output,
        &stdout,
        |s| s.trim_end().to_owned(),
        |s| s.trim_end().to_owned(),
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn info(ctx: &Context, args: InfoArgs) -> Result<(), CliError> {
    util::connect(ctx).await?;
    let value = ctx.remote.api().info(&args.path).await?;
    let out = output::render_single(
        ctx.output,
        &value,
        |v| match v {
            serde_json::Value::String(_) | serde_json::Value::Null => output::value_text(v),
            other => output::render_json_pretty(other),
        },
        output::value_text,
    );
    output::print_output(&out, ctx.quiet);
    Ok(())
}
