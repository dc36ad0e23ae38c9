//! Profile command handlers.

use tabled::Tabled;

use gaggiuino_core::entity::ProfileSelect;
use gaggiuino_core::{Coordinator, CoordinatorConfig, DeviceSnapshot, Profile};

use crate::cli::{GlobalOpts, ProfilesArgs, ProfilesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

impl ProfileRow {
    fn new(profile: &Profile, active_id: Option<u32>) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            active: if active_id == Some(profile.id) { "*" } else { "" },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: CoordinatorConfig,
    args: ProfilesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let select = ProfileSelect::new(config.profile_naming);

    match args.command {
        ProfilesCommand::List => {
            let snap = Coordinator::oneshot(config, |c| async move { Ok(c.snapshot()) }).await?;
            let profiles = snap.profiles.clone().unwrap_or_default();
            let active_id = snap.active_profile_id();
            let out = output::render_list(
                &global.output,
                &profiles,
                |p| ProfileRow::new(p, active_id),
                |p| select.display_name(p),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfilesCommand::Select { profile } => {
            let quiet = global.quiet;
            util::with_coordinator(config, |c| async move {
                let id = resolve_profile(&select, &c.snapshot(), &profile)?.ok_or_else(|| {
                    CliError::NotFound {
                        resource_type: "profile".into(),
                        identifier: profile,
                        list_command: "profiles list".into(),
                    }
                })?;
                let outcome = c.select_profile(id).await?;
                util::report_outcome(outcome, "Active profile", quiet)
            })
            .await
        }
    }
}

/// Map a user argument (numeric id or display name) to a known profile id.
///
/// `Ok(None)` when nothing matches; ambiguous names are an error.
fn resolve_profile(
    select: &ProfileSelect,
    snap: &DeviceSnapshot,
    arg: &str,
) -> Result<Option<u32>, gaggiuino_core::CoreError> {
    if let Ok(id) = arg.parse::<u32>() {
        return Ok(snap.profile_by_id(id).map(|p| p.id));
    }
    let known = snap
        .profiles
        .iter()
        .flatten()
        .any(|p| select.display_name(p) == arg);
    if !known {
        return Ok(None);
    }
    select.resolve(snap, arg).map(Some)
}
