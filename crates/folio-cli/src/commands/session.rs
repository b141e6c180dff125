use chrono::Utc;
use folio_core::session::SecretTier;
use folio_core::FolioError;

use crate::app::{read_new_secret, read_secret, AppContext};
use crate::cli::{LoginArgs, SecretSetArgs, StatusArgs};
use crate::errors::CliError;
use crate::ui::{
    badge, blank_line, format_datetime, format_remaining, header_with_context, hint, kv, print,
    receipt, Badge, OutputMode,
};

fn tier_name(tier: SecretTier) -> &'static str {
    match tier {
        SecretTier::ConfigResource => "config-file",
        SecretTier::LocalOverride => "local-override",
        SecretTier::BuiltIn => "built-in",
    }
}

pub fn handle_login(ctx: &AppContext, args: &LoginArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let secret = read_secret(args.no_input, "Secret")?;

    match workspace.login(&secret) {
        Ok(()) => {}
        Err(FolioError::Auth) => {
            return Err(CliError::auth_failed_with_hint(
                "Incorrect password",
                "Hint: The secret comes from session.secret_file, then `folio secret set`, then session.default_secret.",
            )
            .into());
        }
        Err(err) => return Err(err.into()),
    }

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let expires = workspace
            .session_expires_at()
            .map(|at| format_datetime(&at, ui_ctx.mode.is_pretty()))
            .unwrap_or_else(|| "-".to_string());
        print(&ui_ctx, &receipt(&ui_ctx, "Logged in", &[("Expires", &expires)]));
    }
    Ok(())
}

pub fn handle_logout(ctx: &AppContext) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    workspace.logout()?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        match ui_ctx.mode {
            OutputMode::Pretty => print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "Logged out")),
            OutputMode::Plain | OutputMode::Json => println!("status=ok"),
        }
    }
    Ok(())
}

pub fn handle_status(ctx: &AppContext, args: &StatusArgs) -> anyhow::Result<()> {
    let workspace = ctx.open_workspace()?;
    let store_path = ctx.store_path()?;
    let ui_ctx = ctx.ui_context(args.output.json, args.output.format.as_deref());

    let expires_at = workspace.session_expires_at();
    let (_, tier) = workspace.gate().resolve_secret(workspace.store());
    let categories = workspace.catalog().categories();
    let project_count: usize = categories.iter().map(|c| c.projects.len()).sum();

    if ui_ctx.mode.is_json() {
        let output = serde_json::json!({
            "store": store_path.display().to_string(),
            "authenticated": expires_at.is_some(),
            "expires_at": expires_at.map(|at| at.to_rfc3339()),
            "secret_source": tier_name(tier),
            "categories": categories.len(),
            "projects": project_count,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let store_display = store_path.display().to_string();
    match ui_ctx.mode {
        OutputMode::Pretty => {
            print(
                &ui_ctx,
                &header_with_context(&ui_ctx, "status", None, Some(&store_display)),
            );
            blank_line(&ui_ctx);
            match expires_at {
                Some(at) => {
                    let remaining = format_remaining(at - Utc::now());
                    print(
                        &ui_ctx,
                        &badge(
                            &ui_ctx,
                            Badge::Ok,
                            &format!("Session active ({} left)", remaining),
                        ),
                    );
                    print(&ui_ctx, &kv(&ui_ctx, "Expires", &format_datetime(&at, true)));
                }
                None => {
                    print(&ui_ctx, &badge(&ui_ctx, Badge::Warn, "Not logged in"));
                }
            }
            print(&ui_ctx, &kv(&ui_ctx, "Secret source", tier_name(tier)));
            print(
                &ui_ctx,
                &kv(
                    &ui_ctx,
                    "Catalog",
                    &format!("{} categories, {} projects", categories.len(), project_count),
                ),
            );
            if expires_at.is_none() {
                blank_line(&ui_ctx);
                print(&ui_ctx, &hint(&ui_ctx, "folio login"));
            }
        }
        OutputMode::Plain | OutputMode::Json => {
            println!("store={}", store_display);
            println!("authenticated={}", expires_at.is_some());
            if let Some(at) = expires_at {
                println!("expires_at={}", at.to_rfc3339());
            }
            println!("secret_source={}", tier_name(tier));
            println!("categories={}", categories.len());
            println!("projects={}", project_count);
        }
    }
    Ok(())
}

pub fn handle_secret_set(ctx: &AppContext, args: &SecretSetArgs) -> anyhow::Result<()> {
    let mut workspace = ctx.open_workspace()?;
    let secret = read_new_secret(args.value.as_deref(), args.no_input)?;
    workspace.set_secret_override(&secret)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None);
        let (_, tier) = workspace.gate().resolve_secret(workspace.store());
        print(
            &ui_ctx,
            &receipt(&ui_ctx, "Secret override saved", &[("Active source", tier_name(tier))]),
        );
        if tier == SecretTier::ConfigResource {
            print(
                &ui_ctx,
                &hint(&ui_ctx, "session.secret_file still takes precedence over the override"),
            );
        }
    }
    Ok(())
}
