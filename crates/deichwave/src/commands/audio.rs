//! `volume` and `intensity` handlers.

use serde::Serialize;

use deichwave_core::LevelStore;

use super::{Context, util};
use crate::cli::LevelArgs;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Copy)]
pub enum Level {
    Volume,
    Intensity,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Self::Volume => "Volume",
            Self::Intensity => "Intensity",
        }
    }

    fn store(self, ctx: &Context) -> &LevelStore {
        let stores = ctx.remote.stores();
        match self {
            Self::Volume => stores.volume(),
            Self::Intensity => stores.intensity(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LevelView {
    level: i64,
}

pub async fn handle(ctx: &Context, which: Level, args: LevelArgs) -> Result<(), CliError> {
    util::connect(ctx).await?;
    let store = which.store(ctx);

    if let Some(delta) = args.by {
        let api = ctx.remote.api();
        match which {
            Level::Volume => api.change_volume(delta).await?,
            Level::Intensity => api.change_intensity(delta).await?,
        }
        store.update().await?;
        util::done(ctx, &format!("{} now at {}", which.label(), store.level()));
        return Ok(());
    }

    // Load first so an unchanged level is recognised as a no-op.
    store.update().await?;

    match args.level {
        Some(level) => {
            if store.set(level).await? {
                util::done(ctx, &format!("{} set to {level}", which.label()));
            } else {
                util::done(ctx, &format!("{} already at {level}", which.label()));
            }
        }
        None => {
            let view = LevelView {
                level: store.level(),
            };
            let out = output::render_single(
                ctx.output,
                &view,
                |v| format!("{}: {}", which.label(), v.level),
                |v| v.level.to_string(),
            );
            output::print_output(&out, ctx.quiet);
        }
    }
    Ok(())
}
