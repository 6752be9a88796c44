use std::time::Duration;

use delve::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    bind: String,
    room: RoomConfig,
    websocket: bool,
}

impl Settings {
    /// `DELVE_BIND` (default `127.0.0.1:5000`), `DELVE_ROOM_SECS` (default
    /// 10), `DELVE_REENTRY` (`unlimited` or `once`), and `DELVE_TRANSPORT`
    /// (`tcp` or `ws`).
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut room = RoomConfig::default();
        if let Some(secs) = lookup("DELVE_ROOM_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| format!("DELVE_ROOM_SECS={secs:?}: {e}"))?;
            room.time_limit = Duration::from_secs(secs);
        }
        if let Some(policy) = lookup("DELVE_REENTRY") {
            room.reentry = policy.parse()?;
        }

        let websocket = match lookup("DELVE_TRANSPORT").as_deref().map(str::trim) {
            None | Some("tcp") => false,
            Some("ws") | Some("websocket") => true,
            Some(other) => return Err(format!("DELVE_TRANSPORT={other:?}: expected tcp or ws")),
        };

        Ok(Self {
            bind: lookup("DELVE_BIND").unwrap_or_else(|| "127.0.0.1:5000".to_string()),
            room,
            websocket,
        })
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_lookup(|key| std::env::var(key).ok())?;
    tracing::info!(
        bind = %settings.bind,
        time_limit = ?settings.room.time_limit,
        reentry = %settings.room.reentry,
        websocket = settings.websocket,
        "starting treasure hunt"
    );

    let builder = DelveServerBuilder::new()
        .bind(&settings.bind)
        .room_config(settings.room);

    if settings.websocket {
        let server = builder.build_websocket().await?;
        tokio::select! {
            result = server.run() => result?,
            _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
        }
    } else {
        let server = builder.build().await?;
        tokio::select! {
            result = server.run() => result?,
            _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
        }
    }
    Ok(())
}
